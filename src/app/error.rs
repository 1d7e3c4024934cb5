use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupfeedError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unrecognized capture format: {0}")]
    CaptureFormat(String),

    #[error("Store lock poisoned: {0}")]
    StoreLock(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GroupfeedError>;
