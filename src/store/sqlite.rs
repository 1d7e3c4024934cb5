use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, Row as SqlRow};
use rusqlite_migration::{Migrations, M};

use crate::app::{GroupfeedError, Result};
use crate::domain::{Author, Comment, Post};
use crate::store::Store;

/// Store backed by a SQLite file so an interrupted session can be resumed.
///
/// Reopening the same file keeps every key admitted before, and `seq`
/// preserves admission order across runs.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| GroupfeedError::Other(format!("migration failed: {}", e)))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| GroupfeedError::StoreLock(e.to_string()))
    }

    fn count(&self, table: &str) -> Result<usize> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn post_from_row(row: &SqlRow<'_>) -> rusqlite::Result<Post> {
        Ok(Post {
            post_id: row.get(0)?,
            text: row.get(1)?,
            author: Author {
                name: row.get(2)?,
                id: row.get(3)?,
                profile_url: row.get(4)?,
            },
            email: row.get(5)?,
            first_name: row.get(6)?,
            last_name: row.get(7)?,
        })
    }

    fn comment_from_row(row: &SqlRow<'_>) -> rusqlite::Result<Comment> {
        Ok(Comment {
            comment_id: row.get(0)?,
            post_id: row.get(1)?,
            text: row.get(2)?,
            author_name: row.get(3)?,
            author_id: row.get(4)?,
            author_url: row.get(5)?,
            email: row.get(6)?,
            first_name: row.get(7)?,
            last_name: row.get(8)?,
            timestamp: row.get(9)?,
            permalink: row.get(10)?,
        })
    }
}

impl Store for SqliteStore {
    fn add_post(&self, post: &Post) -> Result<bool> {
        if post.post_id.is_empty() {
            return Ok(false);
        }
        let conn = self.conn()?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO posts
                (post_id, text, author_name, author_id, author_url, email, first_name, last_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                post.post_id,
                post.text,
                post.author.name,
                post.author.id,
                post.author.profile_url,
                post.email,
                post.first_name,
                post.last_name,
            ],
        )?;
        Ok(changed > 0)
    }

    fn add_comments(&self, comments: &[Comment]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut added = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO comments
                    (comment_id, post_id, text, author_name, author_id, author_url,
                     email, first_name, last_name, timestamp, permalink)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;

            for comment in comments.iter().filter(|c| !c.comment_id.is_empty()) {
                added += stmt.execute(params![
                    comment.comment_id,
                    comment.post_id,
                    comment.text,
                    comment.author_name,
                    comment.author_id,
                    comment.author_url,
                    comment.email,
                    comment.first_name,
                    comment.last_name,
                    comment.timestamp,
                    comment.permalink,
                ])?;
            }
        }

        tx.commit()?;
        Ok(added)
    }

    fn posts(&self) -> Result<Vec<Post>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT post_id, text, author_name, author_id, author_url, email, first_name, last_name
             FROM posts ORDER BY seq",
        )?;
        let posts = stmt
            .query_map([], Self::post_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn comments(&self) -> Result<Vec<Comment>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT comment_id, post_id, text, author_name, author_id, author_url,
                    email, first_name, last_name, timestamp, permalink
             FROM comments ORDER BY seq",
        )?;
        let comments = stmt
            .query_map([], Self::comment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    fn post_count(&self) -> Result<usize> {
        self.count("posts")
    }

    fn comment_count(&self) -> Result<usize> {
        self.count("comments")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommentParts;

    fn comment(id: &str, text: &str) -> Comment {
        Comment::from(CommentParts {
            comment_id: id.into(),
            post_id: "p1".into(),
            text: Some(text.into()),
            author_name: Some("Jo Silva".into()),
            timestamp: Some("2024-01-01T00:00:00Z".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_add_and_get_post() {
        let store = SqliteStore::in_memory().unwrap();
        let author = Author {
            name: Some("Jo Silva".into()),
            id: Some("u1".into()),
            profile_url: None,
        };
        let post = Post::new("p1", "hello a@b.com", author);
        assert!(store.add_post(&post).unwrap());
        assert!(!store.add_post(&post).unwrap());

        let posts = store.posts().unwrap();
        assert_eq!(posts, vec![post]);
    }

    #[test]
    fn test_comment_dedup_keeps_first() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.add_comments(&[comment("c1", "first")]).unwrap(), 1);
        assert_eq!(
            store.add_comments(&[comment("c1", "second"), comment("c2", "x"), comment("", "y")]).unwrap(),
            1
        );

        let comments = store.comments().unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text.as_deref(), Some("first"));
        assert_eq!(comments[0].last_name.as_deref(), Some("Silva"));
        assert_eq!(comments[1].comment_id, "c2");
        assert_eq!(store.comment_count().unwrap(), 2);
    }

    #[test]
    fn test_resume_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.add_post(&Post::new("p1", "a", Author::default())).unwrap();
            store.add_comments(&[comment("c1", "x")]).unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert!(!store.add_post(&Post::new("p1", "a", Author::default())).unwrap());
        assert!(store.add_post(&Post::new("p2", "b", Author::default())).unwrap());
        assert_eq!(store.add_comments(&[comment("c1", "x")]).unwrap(), 0);

        let ids: Vec<_> = store.posts().unwrap().into_iter().map(|p| p.post_id).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(store.flatten().unwrap().len(), 3);
    }
}
