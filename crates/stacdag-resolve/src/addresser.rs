//! Turning resolved documents into persisted blocks.

use std::sync::Arc;

use async_trait::async_trait;
use stacdag_codec::{CanonicalEncoder, CodecError};
use stacdag_store::{Block, BlockStore, StoreError};
use stacdag_types::{Cid, ResolvedDocument};

/// Errors from addressing a document.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error(transparent)]
    Encoding(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("addressing task failed: {0}")]
    Task(String),
}

/// Produces the cid of a fully resolved document and persists its block.
///
/// Implementations must be deterministic: documents with identical
/// canonical encodings get identical cids.
#[async_trait]
pub trait ContentAddresser: Send + Sync {
    async fn address(&self, document: &ResolvedDocument) -> Result<Cid, AddressError>;
}

/// [`ContentAddresser`] that encodes canonically and writes to a [`BlockStore`].
///
/// Store writes run on the blocking thread pool.
#[derive(Clone)]
pub struct BlockAddresser {
    encoder: CanonicalEncoder,
    store: Arc<dyn BlockStore>,
}

impl BlockAddresser {
    pub fn new(store: Arc<dyn BlockStore>, encoder: CanonicalEncoder) -> Self {
        Self { encoder, store }
    }
}

impl std::fmt::Debug for BlockAddresser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockAddresser")
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentAddresser for BlockAddresser {
    async fn address(&self, document: &ResolvedDocument) -> Result<Cid, AddressError> {
        let block = Block::new(self.encoder.encode(document)?);
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.put(&block))
            .await
            .map_err(|e| AddressError::Task(e.to_string()))?
            .map_err(AddressError::from)
    }
}

#[async_trait]
impl<T: ContentAddresser + ?Sized> ContentAddresser for Arc<T> {
    async fn address(&self, document: &ResolvedDocument) -> Result<Cid, AddressError> {
        (**self).address(document).await
    }
}
