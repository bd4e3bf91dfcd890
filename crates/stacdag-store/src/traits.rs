use stacdag_types::Cid;

use crate::block::Block;
use crate::error::StoreResult;

/// Content-addressed block sink.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written; the same bytes always produce the
///   same cid, so rewriting an existing block is a no-op.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlockStore: Send + Sync {
    /// Read a block by cid.
    ///
    /// Returns `Ok(None)` if the block does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>>;

    /// Persist a block and return its cid. Idempotent.
    fn put(&self, block: &Block) -> StoreResult<Cid>;

    /// Check whether a block exists.
    fn has(&self, cid: &Cid) -> StoreResult<bool>;

    /// Persist several blocks.
    ///
    /// Default implementation calls `put()` for each block.
    fn put_many(&self, blocks: &[Block]) -> StoreResult<Vec<Cid>> {
        blocks.iter().map(|block| self.put(block)).collect()
    }
}
