pub mod memory;
pub mod sqlite;

use crate::app::Result;
use crate::domain::{Comment, Post};
use crate::export::Row;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Append-only record collection keyed by post and comment ids.
///
/// Admission is a single check-then-insert per record, so any task holding
/// the store may call it.
pub trait Store {
    /// Admit a post with a non-empty, unseen `post_id`. Returns whether it was added.
    fn add_post(&self, post: &Post) -> Result<bool>;
    /// Admit comments with non-empty, unseen ids, in input order. Returns how many were added.
    fn add_comments(&self, comments: &[Comment]) -> Result<usize>;

    /// Posts in admission order.
    fn posts(&self) -> Result<Vec<Post>>;
    /// Comments in admission order.
    fn comments(&self) -> Result<Vec<Comment>>;

    fn post_count(&self) -> Result<usize>;
    fn comment_count(&self) -> Result<usize>;

    /// Every post row followed by every comment row.
    fn flatten(&self) -> Result<Vec<Row>> {
        let posts = self.posts()?;
        let comments = self.comments()?;
        let mut rows = Vec::with_capacity(posts.len() + comments.len());
        rows.extend(posts.iter().map(Row::from));
        rows.extend(comments.iter().map(Row::from));
        Ok(rows)
    }
}
