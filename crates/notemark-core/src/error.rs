use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid note id: {0:?}")]
    InvalidId(String),
}
