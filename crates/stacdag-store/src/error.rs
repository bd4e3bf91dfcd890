use std::path::PathBuf;

use stacdag_types::Cid;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Stored bytes no longer hash to their cid (data corruption).
    #[error("hash mismatch for {cid}: stored bytes hash to {computed}")]
    HashMismatch { cid: Cid, computed: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file in the block directory is not named by a valid cid.
    #[error("unexpected entry in block directory: {}", .0.display())]
    UnexpectedEntry(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
