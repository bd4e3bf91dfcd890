/// Errors from canonical encoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// A passthrough value contains a map that would read back as a link.
    #[error("reserved link key \"/\" at {pointer}")]
    ReservedKey { pointer: String },

    /// The encoded block is larger than the configured limit.
    #[error("block of {size} bytes exceeds the {limit} byte limit")]
    BlockTooLarge { size: usize, limit: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
