//! Error types for the compaction pipeline.

use thiserror::Error;

/// The export could not be understood. Raised before any turn is built.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid JSON export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid JSON export: top-level value is not an object")]
    NotAnObject,

    #[error("invalid JSON export: missing 'chat_messages' or 'messages' field")]
    MissingTurnContainer,
}

/// The injected summarization capability failed.
#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("summarization timed out after {0}s")]
    Timeout(u64),

    #[error("summarization API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("summarization request failed: {0}")]
    Transport(String),

    #[error("malformed summarization response: {0}")]
    MalformedResponse(String),
}

/// Any failure of a compaction run.
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
