pub mod file_reader;
pub mod parallel;

use std::path::Path;

use async_trait::async_trait;

use crate::app::Result;
use crate::normalizer::QueryKind;

pub use file_reader::FileCaptureReader;
pub use parallel::ParallelLoader;

/// One intercepted response, tagged with the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub kind: QueryKind,
    pub body: String,
    /// Where the capture came from, for log messages.
    pub origin: String,
}

#[async_trait]
pub trait CaptureReader {
    async fn read(&self, path: &Path) -> Result<Vec<Capture>>;
}
