use std::future::IntoFuture;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use iroh_blobs::{
    api::{
        blobs::{BlobStatus, Blobs},
        ExportBaoError, RequestError,
    },
    store::{fs::FsStore, mem::MemStore},
    BlobsProtocol, Hash,
};

use super::{Blockstore, BlockstoreError};
use crate::linked_data::{blob_hash, Block, Cid};

/// Client over a local iroh-blob store.
///  This is the crate's concrete Blockstore: blocks are
///  stored as blobs keyed by the BLAKE3 digest inside
///  their CID.
#[derive(Clone, Debug)]
pub struct BlobsStore {
    pub inner: Arc<BlobsProtocol>,
}

impl Deref for BlobsStore {
    type Target = Arc<BlobsProtocol>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BlobsStoreError {
    #[error("blobs store error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("blob store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export bao error: {0}")]
    ExportBao(#[from] ExportBaoError),
    #[error("request error: {0}")]
    Request(#[from] RequestError),
}

impl BlobsStore {
    /// Load a blob store from the given path
    ///
    /// # Arguments
    /// * `path` - Path to the blob store on disk
    pub async fn fs(path: &Path) -> Result<Self, BlobsStoreError> {
        tracing::debug!("BlobsStore::load called with path: {:?}", path);
        let store = FsStore::load(path).await?;
        tracing::debug!("BlobsStore::load completed loading FsStore");
        let blobs = BlobsProtocol::new(&store, None);
        Ok(Self {
            inner: Arc::new(blobs),
        })
    }

    /// Load a memory blobs store
    pub async fn memory() -> Result<Self, BlobsStoreError> {
        let store = MemStore::new();
        let blobs = BlobsProtocol::new(&store, None);
        Ok(Self {
            inner: Arc::new(blobs),
        })
    }

    /// Get a handle to the underlying blobs client against
    ///  the store
    pub fn blobs(&self) -> &Blobs {
        self.inner.store().blobs()
    }

    /// Get a blob as bytes
    pub async fn get_bytes(&self, hash: &Hash) -> Result<Bytes, BlobsStoreError> {
        let bytes = self.blobs().get_bytes(*hash).await?;
        Ok(bytes)
    }

    /// Store bytes as a blob
    pub async fn put_bytes(&self, data: Bytes) -> Result<Hash, BlobsStoreError> {
        let hash = self.blobs().add_bytes(data).into_future().await?.hash;
        Ok(hash)
    }

    /// Whether a blob is completely present
    pub async fn stat(&self, hash: &Hash) -> Result<bool, BlobsStoreError> {
        let stat = self
            .blobs()
            .status(*hash)
            .await
            .map_err(|err| BlobsStoreError::Default(anyhow!(err)))?;
        Ok(matches!(stat, BlobStatus::Complete { .. }))
    }
}

#[async_trait]
impl Blockstore for BlobsStore {
    async fn put(&self, block: Block) -> Result<(), BlockstoreError> {
        let expected = blob_hash(block.cid())?;
        let cid = *block.cid();
        let hash = self.put_bytes(block.into_data()).await?;
        if hash != expected {
            tracing::error!("BlobsStore::put: block {} stored under {}", cid, hash);
            return Err(BlockstoreError::HashMismatch(cid));
        }
        tracing::trace!("BlobsStore::put: stored block {}", cid);
        Ok(())
    }

    async fn get(&self, cid: &Cid) -> Result<Block, BlockstoreError> {
        // a CID we can't key by can't be in the store
        let Ok(hash) = blob_hash(cid) else {
            return Err(BlockstoreError::NotFound(*cid));
        };
        if !self.stat(&hash).await? {
            return Err(BlockstoreError::NotFound(*cid));
        }
        let data = self.get_bytes(&hash).await?;
        Ok(Block::from_parts(*cid, data))
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockstoreError> {
        match blob_hash(cid) {
            Ok(hash) => Ok(self.stat(&hash).await?),
            Err(_) => Ok(false),
        }
    }
}
