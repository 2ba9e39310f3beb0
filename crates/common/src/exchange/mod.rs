//! Moving blocks between peers.
//!
//! An [`Exchange`] answers `get_block` from local storage when it can and
//!  otherwise asks [`ContentRouting`] who provides the block and pulls it
//!  over a [`Transport`]. [`SessionGenerator`] wires one of these up per
//!  logical peer on top of a shared [`VirtualNetwork`] and [`MockRouting`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod bitswap;
pub mod network;
mod routing;
mod session;

pub use bitswap::BlockExchange;
pub use network::{NetworkAdapter, NetworkError, Transport, VirtualNetwork};
pub use routing::{ContentRouting, MockRouting, RoutingClient, RoutingError};
pub use session::{Session, SessionError, SessionGenerator};

use crate::blockstore::{Blockstore, BlockstoreError};
use crate::cancel::{until_cancelled, CancellationToken};
use crate::error::ErrorKind;
use crate::linked_data::{Block, Cid};

/// Identity of a peer on a virtual network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(u64);

impl PeerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{:04}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("block {0} not found locally or on any provider")]
    NotFound(Cid),
    #[error("request for block {0} was cancelled")]
    Cancelled(Cid),
    #[error("no provider returned a block matching {0}")]
    Corrupt(Cid),
    #[error("blockstore error: {0}")]
    Blockstore(#[from] BlockstoreError),
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
}

impl ExchangeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExchangeError::NotFound(_) => ErrorKind::NotFound,
            ExchangeError::Cancelled(_) => ErrorKind::Cancelled,
            ExchangeError::Corrupt(_) => ErrorKind::Corrupt,
            ExchangeError::Blockstore(err) => err.kind(),
            ExchangeError::Routing(_) | ExchangeError::Network(_) => ErrorKind::Other,
        }
    }
}

/// Block-level get/put that may reach beyond local storage
#[async_trait]
pub trait Exchange: Send + Sync + fmt::Debug {
    /// Fetch a block, from local storage or from a provider.
    ///  Returns [`ExchangeError::Cancelled`] as soon as `cancel` fires.
    async fn get_block(&self, cid: &Cid, cancel: &CancellationToken)
        -> Result<Block, ExchangeError>;

    /// Store a block locally and make it available to other peers
    async fn put_block(&self, block: Block) -> Result<(), ExchangeError>;

    /// Whether the block is held locally
    async fn has_block(&self, cid: &Cid) -> Result<bool, ExchangeError>;

    /// Announce a block that is already held locally.
    ///  Exchanges without a routing layer have nothing to announce.
    async fn provide(&self, _cid: &Cid) -> Result<(), ExchangeError> {
        Ok(())
    }
}

#[async_trait]
impl<E: Exchange + ?Sized> Exchange for Arc<E> {
    async fn get_block(
        &self,
        cid: &Cid,
        cancel: &CancellationToken,
    ) -> Result<Block, ExchangeError> {
        (**self).get_block(cid, cancel).await
    }

    async fn put_block(&self, block: Block) -> Result<(), ExchangeError> {
        (**self).put_block(block).await
    }

    async fn has_block(&self, cid: &Cid) -> Result<bool, ExchangeError> {
        (**self).has_block(cid).await
    }

    async fn provide(&self, cid: &Cid) -> Result<(), ExchangeError> {
        (**self).provide(cid).await
    }
}

/// An exchange that never leaves local storage
#[derive(Debug, Clone)]
pub struct OfflineExchange {
    blockstore: Arc<dyn Blockstore>,
}

impl OfflineExchange {
    pub fn new(blockstore: Arc<dyn Blockstore>) -> Self {
        Self { blockstore }
    }
}

#[async_trait]
impl Exchange for OfflineExchange {
    async fn get_block(
        &self,
        cid: &Cid,
        cancel: &CancellationToken,
    ) -> Result<Block, ExchangeError> {
        let result = until_cancelled(cancel, self.blockstore.get(cid))
            .await
            .ok_or(ExchangeError::Cancelled(*cid))?;
        match result {
            Ok(block) => Ok(block),
            Err(BlockstoreError::NotFound(cid)) => Err(ExchangeError::NotFound(cid)),
            Err(err) => Err(err.into()),
        }
    }

    async fn put_block(&self, block: Block) -> Result<(), ExchangeError> {
        self.blockstore.put(block).await?;
        Ok(())
    }

    async fn has_block(&self, cid: &Cid) -> Result<bool, ExchangeError> {
        Ok(self.blockstore.has(cid).await?)
    }
}
