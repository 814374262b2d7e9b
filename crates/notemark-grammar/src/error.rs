use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar checker not initialized")]
    NotInitialized,

    #[error("failed to start LanguageTool server: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("grammar service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("grammar service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode grammar service response: {0}")]
    Decode(#[from] serde_json::Error),
}
