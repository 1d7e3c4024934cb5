use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::app::error::{GroupfeedError, Result};
use crate::capture::Capture;
use crate::config::ScrapeConfig;
use crate::domain::{Comment, Post, PostStub};
use crate::export::CsvExporter;
use crate::normalizer::Normalizer;
use crate::store::{MemoryStore, SqliteStore, Store};

/// What one ingestion call added to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub posts_added: usize,
    pub comments_added: usize,
    pub units_skipped: usize,
    /// The post cap was reached and input was ignored.
    pub capped: bool,
}

impl IngestReport {
    pub fn merge(&mut self, other: IngestReport) {
        self.posts_added += other.posts_added;
        self.comments_added += other.comments_added;
        self.units_skipped += other.units_skipped;
        self.capped |= other.capped;
    }
}

/// One scrape run: the store it fills, the normalizer feeding it and its limits.
pub struct ScrapeSession {
    store: Arc<dyn Store + Send + Sync>,
    normalizer: Normalizer,
    config: ScrapeConfig,
    /// Serializes the cap check with post admission.
    admission: Mutex<()>,
}

impl ScrapeSession {
    pub fn new(store: Arc<dyn Store + Send + Sync>, config: ScrapeConfig) -> Self {
        let normalizer = if config.deep_search {
            Normalizer::new()
        } else {
            Normalizer::without_deep_search()
        };

        Self {
            store,
            normalizer,
            config,
            admission: Mutex::new(()),
        }
    }

    pub fn in_memory(config: ScrapeConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    /// Session backed by a SQLite file; reopening the file resumes it.
    pub fn resumable<P: AsRef<Path>>(path: P, config: ScrapeConfig) -> Result<Self> {
        let store = SqliteStore::new(path)?;
        Ok(Self::new(Arc::new(store), config))
    }

    pub fn store(&self) -> &Arc<dyn Store + Send + Sync> {
        &self.store
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    fn cap_reached(&self) -> Result<bool> {
        match self.config.cap() {
            Some(cap) => Ok(self.store.post_count()? >= cap),
            None => Ok(false),
        }
    }

    /// Admit posts until the cap.
    ///
    /// Returns how many were added and the ids the cap turned away; the cap
    /// stopped admission when that list is non-empty.
    fn admit_posts<'a>(&self, posts: impl IntoIterator<Item = &'a Post>) -> Result<(usize, Vec<&'a str>)> {
        let _guard = self
            .admission
            .lock()
            .map_err(|e| GroupfeedError::StoreLock(e.to_string()))?;

        let mut added = 0;
        let mut refused = Vec::new();
        for post in posts {
            if !refused.is_empty() || self.cap_reached()? {
                refused.push(post.post_id.as_str());
                continue;
            }
            if self.store.add_post(post)? {
                added += 1;
            }
        }
        Ok((added, refused))
    }

    /// Normalize one captured response and admit its records.
    ///
    /// Once the post cap is reached, further captures are ignored entirely.
    /// When the cap is hit partway through a capture, comments on the posts it
    /// turned away are dropped with them.
    pub fn ingest(&self, capture: &Capture) -> Result<IngestReport> {
        if self.cap_reached()? {
            tracing::debug!(origin = %capture.origin, "post cap reached, capture ignored");
            return Ok(IngestReport {
                capped: true,
                ..IngestReport::default()
            });
        }

        let normalized = self
            .normalizer
            .normalize_body(capture.kind, &capture.body, None);
        if normalized.skipped > 0 {
            tracing::warn!(
                origin = %capture.origin,
                skipped = normalized.skipped,
                "response units dropped"
            );
        }

        let (posts_added, refused) = self.admit_posts(&normalized.posts)?;
        let capped = !refused.is_empty();
        let comments_added = if capped {
            let kept: Vec<Comment> = normalized
                .comments
                .iter()
                .filter(|c| !refused.contains(&c.post_id.as_str()))
                .cloned()
                .collect();
            self.store.add_comments(&kept)?
        } else {
            self.store.add_comments(&normalized.comments)?
        };

        tracing::debug!(
            origin = %capture.origin,
            kind = %capture.kind,
            posts_added,
            comments_added,
            "capture ingested"
        );

        Ok(IngestReport {
            posts_added,
            comments_added,
            units_skipped: normalized.skipped,
            capped,
        })
    }

    /// Admit page-derived post stubs, which need no parsing.
    pub fn ingest_stubs(&self, stubs: Vec<PostStub>) -> Result<usize> {
        let posts: Vec<Post> = stubs.into_iter().map(Post::from).collect();
        let (added, refused) = self.admit_posts(&posts)?;
        if !refused.is_empty() {
            tracing::info!("post cap reached while adding page stubs");
        }
        Ok(added)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let rows = self.store.flatten()?;
        CsvExporter::write(writer, &rows)
    }

    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let rows = self.store.flatten()?;
        CsvExporter::export(path, &rows)?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::normalizer::QueryKind;

    fn feed_capture(ids: &[&str]) -> Capture {
        let body = ids
            .iter()
            .map(|id| json!({"data": {"node": {"post_id": id, "message": {"text": format!("post {}", id)}}}}).to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Capture {
            kind: QueryKind::Feed,
            body,
            origin: "test".into(),
        }
    }

    fn config(max_posts: usize) -> ScrapeConfig {
        ScrapeConfig {
            max_posts,
            ..ScrapeConfig::default()
        }
    }

    #[test]
    fn test_ingest_counts() {
        let session = ScrapeSession::in_memory(config(0));
        let report = session.ingest(&feed_capture(&["p1", "p2", "p1"])).unwrap();
        assert_eq!(report.posts_added, 2);
        assert!(!report.capped);

        let again = session.ingest(&feed_capture(&["p2", "p3"])).unwrap();
        assert_eq!(again.posts_added, 1);
        assert_eq!(session.store().post_count().unwrap(), 3);
    }

    #[test]
    fn test_skipped_units_reported() {
        let session = ScrapeSession::in_memory(config(0));
        let mut capture = feed_capture(&["p1", "p3"]);
        capture.body = capture.body.replacen('\n', "\n{broken\n", 1);

        let report = session.ingest(&capture).unwrap();
        assert_eq!(report.posts_added, 2);
        assert_eq!(report.units_skipped, 1);
    }

    #[test]
    fn test_post_cap() {
        let session = ScrapeSession::in_memory(config(2));
        let report = session.ingest(&feed_capture(&["p1", "p2", "p3"])).unwrap();
        assert_eq!(report.posts_added, 2);
        assert!(report.capped);

        let ignored = session.ingest(&feed_capture(&["p4"])).unwrap();
        assert_eq!(ignored, IngestReport { capped: true, ..IngestReport::default() });
        assert_eq!(session.store().post_count().unwrap(), 2);
    }

    #[test]
    fn test_cap_drops_comments_of_refused_posts() {
        let session = ScrapeSession::in_memory(config(1));
        let body = ["p1", "p2"]
            .iter()
            .map(|id| {
                json!({"data": {"node": {
                    "post_id": id,
                    "feedback_context": {"interesting_top_level_comments": [
                        {"comment": {"id": format!("c-{}", id), "author": {"name": "Lu Reis"}}}
                    ]}
                }}})
                .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");
        let capture = Capture {
            kind: QueryKind::Feed,
            body,
            origin: "test".into(),
        };

        let report = session.ingest(&capture).unwrap();
        assert_eq!(report.posts_added, 1);
        assert_eq!(report.comments_added, 1);
        assert!(report.capped);

        let comments = session.store().comments().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment_id, "c-p1");
        assert_eq!(comments[0].post_id, "p1");
    }

    #[test]
    fn test_stubs() {
        let session = ScrapeSession::in_memory(config(0));
        let stubs = vec![
            PostStub { id: Some("s1".into()), text: "a".into(), author: Some("Ana".into()) },
            PostStub { id: None, text: "b".into(), author: Some("Bo".into()) },
            PostStub { id: None, text: "b".into(), author: Some("Bo".into()) },
        ];
        assert_eq!(session.ingest_stubs(stubs).unwrap(), 2);
    }

    #[test]
    fn test_write_csv() {
        let session = ScrapeSession::in_memory(config(0));
        session.ingest(&feed_capture(&["p1"])).unwrap();

        let mut buf = Vec::new();
        session.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"post p1\""));
    }

    #[test]
    fn test_resumable_session() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("session.db");

        let first = ScrapeSession::resumable(&db, config(0)).unwrap();
        first.ingest(&feed_capture(&["p1"])).unwrap();
        drop(first);

        let second = ScrapeSession::resumable(&db, config(0)).unwrap();
        let report = second.ingest(&feed_capture(&["p1", "p2"])).unwrap();
        assert_eq!(report.posts_added, 1);
        assert_eq!(second.store().post_count().unwrap(), 2);
    }
}
