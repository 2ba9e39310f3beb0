//! Local block storage keyed by CID.
//!
//! [`Blockstore`] is the storage seam the exchange is written against.
//!  [`BlobsStore`] is the concrete implementation over iroh-blobs, and any
//!  blockstore can be wrapped in [`Delayed`](crate::delay::Delayed) to
//!  model a slow disk.

use std::sync::Arc;

use async_trait::async_trait;

mod blobs_store;

pub use blobs_store::{BlobsStore, BlobsStoreError};

use crate::delay::Delayed;
use crate::error::ErrorKind;
use crate::linked_data::{Block, Cid, CidError};

#[derive(Debug, thiserror::Error)]
pub enum BlockstoreError {
    #[error("block not found: {0}")]
    NotFound(Cid),
    #[error("block {0} does not hash to its cid")]
    HashMismatch(Cid),
    #[error("cid error: {0}")]
    Cid(#[from] CidError),
    #[error("blobs store error: {0}")]
    BlobsStore(#[from] BlobsStoreError),
}

impl BlockstoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockstoreError::NotFound(_) => ErrorKind::NotFound,
            BlockstoreError::HashMismatch(_) => ErrorKind::Corrupt,
            BlockstoreError::Cid(_) => ErrorKind::InvalidReference,
            BlockstoreError::BlobsStore(_) => ErrorKind::Other,
        }
    }
}

/// Keyed local storage of blocks.
///
/// `get` of an absent CID fails with [`BlockstoreError::NotFound`]; that is
///  an ordinary outcome the exchange uses to decide on a remote fetch.
#[async_trait]
pub trait Blockstore: Send + Sync + std::fmt::Debug {
    async fn put(&self, block: Block) -> Result<(), BlockstoreError>;

    async fn get(&self, cid: &Cid) -> Result<Block, BlockstoreError>;

    async fn has(&self, cid: &Cid) -> Result<bool, BlockstoreError>;
}

#[async_trait]
impl<B: Blockstore + ?Sized> Blockstore for Arc<B> {
    async fn put(&self, block: Block) -> Result<(), BlockstoreError> {
        (**self).put(block).await
    }

    async fn get(&self, cid: &Cid) -> Result<Block, BlockstoreError> {
        (**self).get(cid).await
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockstoreError> {
        (**self).has(cid).await
    }
}

#[async_trait]
impl<B: Blockstore> Blockstore for Delayed<B> {
    async fn put(&self, block: Block) -> Result<(), BlockstoreError> {
        self.after_delay().await.put(block).await
    }

    async fn get(&self, cid: &Cid) -> Result<Block, BlockstoreError> {
        self.after_delay().await.get(cid).await
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockstoreError> {
        self.after_delay().await.has(cid).await
    }
}
