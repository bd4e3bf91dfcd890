//! Canonical block encoding for stacdag.
//!
//! Turns a [`ResolvedDocument`](stacdag_types::ResolvedDocument) into the
//! bytes of its block. Two documents with the same final content always
//! encode to the same bytes, so they always share a
//! [`Cid`](stacdag_types::Cid).

pub mod canonical;
pub mod error;

pub use canonical::{extract_links, CanonicalEncoder, DEFAULT_MAX_BLOCK_SIZE};
pub use error::{CodecError, CodecResult};
