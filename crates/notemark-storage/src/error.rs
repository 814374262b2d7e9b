use notemark_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing store configuration: {0}")]
    MissingConfig(&'static str),

    #[error("failed to connect to document store: {0}")]
    Connect(String),

    #[error("invalid note id: {0:?}")]
    InvalidId(String),

    #[error("note not found: {id}")]
    NotFound { id: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },

    #[error("document store error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("insert did not return an object id")]
    MissingInsertedId,

    #[error("stored document {id} is malformed: {reason}")]
    Corrupt { id: String, reason: String },
}

impl From<CoreError> for StoreError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidId(raw) => StoreError::InvalidId(raw),
        }
    }
}
