use stacdag_types::Cid;

use crate::error::{StoreError, StoreResult};

/// An immutable block: canonical bytes keyed by their cid.
///
/// The store never interprets block contents; it is a pure key-value store
/// keyed by content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    cid: Cid,
    data: Vec<u8>,
}

impl Block {
    /// Create a block from encoded bytes, computing its cid.
    pub fn new(data: Vec<u8>) -> Self {
        let cid = Cid::from_bytes(&data);
        Self { cid, data }
    }

    /// Rebuild a block read back from storage, checking the bytes against
    /// the cid they were stored under.
    pub fn from_parts(cid: Cid, data: Vec<u8>) -> StoreResult<Self> {
        let computed = Cid::from_bytes(&data);
        if computed != cid {
            return Err(StoreError::HashMismatch {
                cid,
                computed: computed.to_string(),
            });
        }
        Ok(Self { cid, data })
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size of the block in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
