pub mod context;
pub mod error;

pub use context::{IngestReport, ScrapeSession};
pub use error::{GroupfeedError, Result};
