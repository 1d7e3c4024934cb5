use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::app::{GroupfeedError, IngestReport, Result, ScrapeSession};
use crate::capture::CaptureReader;

pub const DEFAULT_WORKERS: usize = 4;

/// Reads capture files concurrently and feeds each into a shared session.
///
/// Files finish in whatever order their reads complete, so the admission
/// order of records (and therefore export row order) follows completion
/// rather than the order of `paths`.
pub struct ParallelLoader {
    reader: Arc<dyn CaptureReader + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelLoader {
    pub fn new(reader: Arc<dyn CaptureReader + Send + Sync>) -> Self {
        Self::with_workers(reader, DEFAULT_WORKERS)
    }

    pub fn with_workers(reader: Arc<dyn CaptureReader + Send + Sync>, workers: usize) -> Self {
        Self {
            reader,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub async fn ingest_all(
        &self,
        paths: Vec<PathBuf>,
        session: Arc<ScrapeSession>,
    ) -> Vec<(PathBuf, Result<IngestReport>)> {
        let mut tasks = FuturesUnordered::new();

        for path in paths {
            let reader = self.reader.clone();
            let semaphore = self.semaphore.clone();
            let session = session.clone();

            tasks.push(tokio::spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => ingest_file(&reader, &path, &session).await,
                    Err(e) => Err(GroupfeedError::Other(e.to_string())),
                };
                (path, result)
            }));
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        results
    }
}

async fn ingest_file(
    reader: &Arc<dyn CaptureReader + Send + Sync>,
    path: &Path,
    session: &ScrapeSession,
) -> Result<IngestReport> {
    let captures = reader.read(path).await?;

    let mut report = IngestReport::default();
    for capture in &captures {
        report.merge(session.ingest(capture)?);
    }

    tracing::info!(
        path = %path.display(),
        posts = report.posts_added,
        comments = report.comments_added,
        skipped = report.units_skipped,
        "capture file ingested"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::capture::Capture;
    use crate::config::ScrapeConfig;
    use crate::normalizer::QueryKind;
    use crate::store::Store;

    /// Serves one focused-comments capture per path, keyed by file name.
    struct StubReader;

    #[async_trait]
    impl CaptureReader for StubReader {
        async fn read(&self, path: &Path) -> Result<Vec<Capture>> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name == "broken" {
                return Err(GroupfeedError::CaptureFormat(name.to_string()));
            }
            let body = serde_json::json!({"data": {
                "story_card": {"post_id": "p1"},
                "node": {"comment_rendering_instance_for_feed_location": {"comments": {"edges": [
                    {"node": {"id": format!("c-{}", name)}},
                    {"node": {"id": "shared"}}
                ]}}}
            }})
            .to_string();
            Ok(vec![Capture {
                kind: QueryKind::FocusedComments,
                body,
                origin: name.to_string(),
            }])
        }
    }

    #[tokio::test]
    async fn test_ingest_all_dedups_across_files() {
        let session = Arc::new(ScrapeSession::in_memory(ScrapeConfig::default()));
        let loader = ParallelLoader::with_workers(Arc::new(StubReader), 3);
        let paths: Vec<PathBuf> = ["a", "b", "c", "d", "broken"].iter().map(PathBuf::from).collect();

        let results = loader.ingest_all(paths, session.clone()).await;
        assert_eq!(results.len(), 5);

        let failures = results.iter().filter(|(_, r)| r.is_err()).count();
        assert_eq!(failures, 1);

        let added: usize = results
            .iter()
            .filter_map(|(_, r)| r.as_ref().ok())
            .map(|r| r.comments_added)
            .sum();
        assert_eq!(added, 5);
        assert_eq!(session.store().comment_count().unwrap(), 5);
    }
}
