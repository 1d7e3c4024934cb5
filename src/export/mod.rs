//! Tabular export of stored records.
//!
//! Every row carries all [`COLUMNS`]. Fields are always quoted and a value the
//! record does not have is written as an empty quoted string, so `""` means
//! either "empty" or "absent" in the output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;

use crate::app::Result;
use crate::domain::{Comment, Post};

pub const COLUMNS: [&str; 16] = [
    "id",
    "email",
    "firstName",
    "lastName",
    "postId",
    "postText",
    "postAuthor",
    "postAuthorId",
    "postAuthorUrl",
    "commentId",
    "commentText",
    "commentAuthorName",
    "commentAuthorId",
    "commentAuthorUrl",
    "timestamp",
    "commentUrl",
];

/// One flattened post or comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub post_id: Option<String>,
    pub post_text: Option<String>,
    pub post_author: Option<String>,
    pub post_author_id: Option<String>,
    pub post_author_url: Option<String>,
    pub comment_id: Option<String>,
    pub comment_text: Option<String>,
    pub comment_author_name: Option<String>,
    pub comment_author_id: Option<String>,
    pub comment_author_url: Option<String>,
    pub timestamp: Option<String>,
    pub comment_url: Option<String>,
}

impl Row {
    /// Values in [`COLUMNS`] order.
    pub fn values(&self) -> [Option<&str>; 16] {
        [
            self.id.as_deref(),
            self.email.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.post_id.as_deref(),
            self.post_text.as_deref(),
            self.post_author.as_deref(),
            self.post_author_id.as_deref(),
            self.post_author_url.as_deref(),
            self.comment_id.as_deref(),
            self.comment_text.as_deref(),
            self.comment_author_name.as_deref(),
            self.comment_author_id.as_deref(),
            self.comment_author_url.as_deref(),
            self.timestamp.as_deref(),
            self.comment_url.as_deref(),
        ]
    }
}

impl From<&Post> for Row {
    fn from(post: &Post) -> Self {
        Self {
            id: Some(post.post_id.clone()),
            email: Some(post.email.clone()),
            first_name: post.first_name.clone(),
            last_name: post.last_name.clone(),
            post_id: Some(post.post_id.clone()),
            post_text: Some(post.text.clone()),
            post_author: post.author.name.clone(),
            post_author_id: post.author.id.clone(),
            post_author_url: post.author.profile_url.clone(),
            ..Self::default()
        }
    }
}

/// Comment rows keep `postId` as the reference to their post.
impl From<&Comment> for Row {
    fn from(comment: &Comment) -> Self {
        Self {
            id: Some(comment.comment_id.clone()),
            email: Some(comment.email.clone()),
            first_name: comment.first_name.clone(),
            last_name: comment.last_name.clone(),
            post_id: Some(comment.post_id.clone()).filter(|id| !id.is_empty()),
            comment_id: Some(comment.comment_id.clone()),
            comment_text: comment.text.clone(),
            comment_author_name: comment.author_name.clone(),
            comment_author_id: comment.author_id.clone(),
            comment_author_url: comment.author_url.clone(),
            timestamp: comment.timestamp.clone(),
            comment_url: comment.permalink.clone(),
            ..Self::default()
        }
    }
}

pub struct CsvExporter;

impl CsvExporter {
    /// Write the header and rows to `writer`.
    pub fn write<W: Write>(writer: W, rows: &[Row]) -> Result<()> {
        let mut wtr = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(writer);

        wtr.write_record(COLUMNS)?;
        for row in rows {
            wtr.write_record(row.values().iter().map(|v| v.unwrap_or("")))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn export<P: AsRef<Path>>(path: P, rows: &[Row]) -> Result<()> {
        let file = File::create(path.as_ref())?;
        Self::write(file, rows)?;
        tracing::info!(path = %path.as_ref().display(), rows = rows.len(), "CSV written");
        Ok(())
    }
}
