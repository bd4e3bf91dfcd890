//! Content-addressed block storage for stacdag.
//!
//! Every document of a converted catalog ends up here as an immutable
//! [`Block`] identified by the BLAKE3 hash of its canonical bytes.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for dry runs and tests
//! - [`FsBlockStore`] -- one file per block, named by its cid
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content-addressing guarantees this).
//! 2. Writing a block that already exists is a no-op.
//! 3. Concurrent reads are always safe.
//! 4. The store never interprets block contents.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod block;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use block::Block;
pub use error::{StoreError, StoreResult};
pub use fs::FsBlockStore;
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
