use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::app::{GroupfeedError, Result};
use crate::domain::{Comment, Post};
use crate::store::Store;

#[derive(Default)]
struct Records {
    posts: Vec<Post>,
    post_ids: HashSet<String>,
    comments: Vec<Comment>,
    comment_ids: HashSet<String>,
}

/// Store kept for one scrape session and dropped with it.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>> {
        self.records
            .lock()
            .map_err(|e| GroupfeedError::StoreLock(e.to_string()))
    }
}

impl Store for MemoryStore {
    fn add_post(&self, post: &Post) -> Result<bool> {
        if post.post_id.is_empty() {
            return Ok(false);
        }
        let mut records = self.lock()?;
        if !records.post_ids.insert(post.post_id.clone()) {
            return Ok(false);
        }
        records.posts.push(post.clone());
        Ok(true)
    }

    fn add_comments(&self, comments: &[Comment]) -> Result<usize> {
        let mut records = self.lock()?;
        let mut added = 0;
        for comment in comments {
            if comment.comment_id.is_empty() {
                continue;
            }
            if records.comment_ids.insert(comment.comment_id.clone()) {
                records.comments.push(comment.clone());
                added += 1;
            }
        }
        Ok(added)
    }

    fn posts(&self) -> Result<Vec<Post>> {
        Ok(self.lock()?.posts.clone())
    }

    fn comments(&self) -> Result<Vec<Comment>> {
        Ok(self.lock()?.comments.clone())
    }

    fn post_count(&self) -> Result<usize> {
        Ok(self.lock()?.posts.len())
    }

    fn comment_count(&self) -> Result<usize> {
        Ok(self.lock()?.comments.len())
    }
}
