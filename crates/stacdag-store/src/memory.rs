use std::collections::HashMap;
use std::sync::RwLock;

use stacdag_types::Cid;

use crate::block::Block;
use crate::error::StoreResult;
use crate::traits::BlockStore;

/// In-memory, HashMap-based block store.
///
/// Backs dry runs and tests. Blocks are held behind a `RwLock` and cloned on
/// read/write.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Cid, Block>>,
}

impl InMemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(Block::size)
            .sum()
    }

    /// Sorted list of every cid in the store.
    pub fn cids(&self) -> Vec<Cid> {
        let map = self.blocks.read().expect("lock poisoned");
        let mut cids: Vec<Cid> = map.keys().copied().collect();
        cids.sort();
        cids
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.get(cid).cloned())
    }

    fn put(&self, block: &Block) -> StoreResult<Cid> {
        let cid = *block.cid();
        let mut map = self.blocks.write().expect("lock poisoned");
        map.entry(cid).or_insert_with(|| block.clone());
        Ok(cid)
    }

    fn has(&self, cid: &Cid) -> StoreResult<bool> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(cid))
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(content: &[u8]) -> Block {
        Block::new(content.to_vec())
    }

    #[test]
    fn put_and_get() {
        let store = InMemoryBlockStore::new();
        let b = block(br#"{"id":"a","links":[]}"#);
        let cid = store.put(&b).unwrap();
        assert_eq!(cid, *b.cid());
        assert_eq!(store.get(&cid).unwrap(), Some(b));
    }

    #[test]
    fn same_content_is_stored_once() {
        let store = InMemoryBlockStore::new();
        let first = store.put(&block(b"identical")).unwrap();
        let second = store.put(&block(b"identical")).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_block_reads_as_none() {
        let store = InMemoryBlockStore::new();
        let cid = Cid::from_bytes(b"missing");
        assert!(store.get(&cid).unwrap().is_none());
        assert!(!store.has(&cid).unwrap());
    }

    #[test]
    fn put_many_returns_cids_in_order() {
        let store = InMemoryBlockStore::new();
        let blocks = vec![block(b"one"), block(b"two"), block(b"three")];
        let cids = store.put_many(&blocks).unwrap();
        assert_eq!(cids.len(), 3);
        for (cid, b) in cids.iter().zip(&blocks) {
            assert_eq!(cid, b.cid());
        }
        assert_eq!(store.total_bytes(), 11);
    }

    #[test]
    fn cids_are_sorted() {
        let store = InMemoryBlockStore::new();
        for content in [&b"c"[..], b"a", b"b"] {
            store.put(&block(content)).unwrap();
        }
        let cids = store.cids();
        let mut sorted = cids.clone();
        sorted.sort();
        assert_eq!(cids, sorted);
    }
}
