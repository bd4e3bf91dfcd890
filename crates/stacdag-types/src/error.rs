use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid cid: {0}")]
    InvalidCid(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("malformed json: {0}")]
    MalformedJson(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("malformed link at index {index}: {reason}")]
    MalformedLink { index: usize, reason: String },
}
