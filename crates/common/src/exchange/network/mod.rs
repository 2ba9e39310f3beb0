//! In-process peer network.
//!
//! Peers register their blockstore with a [`VirtualNetwork`]; a
//!  [`NetworkAdapter`] sends bincode frames to a registered peer and the
//!  remote side answers out of its own (possibly slow) store. The network
//!  delay is paid once per request round trip.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

mod messages;

pub use messages::{decode_cid, Message, Reply};

use super::PeerId;
use crate::blockstore::{Blockstore, BlockstoreError};
use crate::delay::{Delay, Delayed};
use crate::linked_data::{Block, Cid};

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("network is closed")]
    Closed,
    #[error("unknown peer: {0}")]
    UnknownPeer(PeerId),
    #[error("frame codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("peer {peer} failed to serve the request: {reason}")]
    Remote { peer: PeerId, reason: String },
}

/// Point-to-point block requests
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Ask `peer` for a block. `Ok(None)` means the peer doesn't have it.
    async fn request(&self, peer: PeerId, cid: &Cid) -> Result<Option<Block>, NetworkError>;
}

#[async_trait]
impl<T: Transport> Transport for Delayed<T> {
    async fn request(&self, peer: PeerId, cid: &Cid) -> Result<Option<Block>, NetworkError> {
        self.after_delay().await.request(peer, cid).await
    }
}

#[derive(Debug, Clone)]
pub struct VirtualNetwork {
    inner: Arc<NetworkInner>,
    delay: Delay,
}

#[derive(Debug, Default)]
struct NetworkInner {
    peers: RwLock<HashMap<PeerId, Arc<dyn Blockstore>>>,
    closed: AtomicBool,
}

impl NetworkInner {
    fn check_open(&self) -> Result<(), NetworkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(NetworkError::Closed);
        }
        Ok(())
    }
}

impl VirtualNetwork {
    pub fn new(delay: Delay) -> Self {
        Self {
            inner: Arc::new(NetworkInner::default()),
            delay,
        }
    }

    pub fn delay(&self) -> &Delay {
        &self.delay
    }

    /// Make `store` reachable as `peer`
    pub fn register(&self, peer: PeerId, store: Arc<dyn Blockstore>) -> Result<(), NetworkError> {
        self.inner.check_open()?;
        self.inner.peers.write().insert(peer, store);
        tracing::debug!(%peer, "VirtualNetwork::register: peer joined");
        Ok(())
    }

    pub fn unregister(&self, peer: PeerId) {
        if self.inner.peers.write().remove(&peer).is_some() {
            tracing::debug!(%peer, "VirtualNetwork::unregister: peer left");
        }
    }

    pub fn peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<_> = self.inner.peers.read().keys().copied().collect();
        peers.sort();
        peers
    }

    /// A transport that sends as `peer`
    pub fn adapter(&self, peer: PeerId) -> Delayed<NetworkAdapter> {
        let adapter = NetworkAdapter {
            local: peer,
            inner: self.inner.clone(),
        };
        Delayed::new(adapter, self.delay.clone())
    }

    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.peers.write().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

/// One peer's connection to a [`VirtualNetwork`]
#[derive(Debug, Clone)]
pub struct NetworkAdapter {
    local: PeerId,
    inner: Arc<NetworkInner>,
}

impl NetworkAdapter {
    pub fn local_peer(&self) -> PeerId {
        self.local
    }
}

#[async_trait]
impl Transport for NetworkAdapter {
    async fn request(&self, peer: PeerId, cid: &Cid) -> Result<Option<Block>, NetworkError> {
        self.inner.check_open()?;
        let remote = self
            .inner
            .peers
            .read()
            .get(&peer)
            .cloned()
            .ok_or(NetworkError::UnknownPeer(peer))?;

        let frame = Message::want_block(cid).to_frame()?;
        tracing::debug!(from = %self.local, to = %peer, %cid, "NetworkAdapter::request: want block");
        let reply = serve(remote.as_ref(), &frame).await?;

        match Reply::from_frame(&reply)? {
            Reply::Block { data } => Ok(Some(Block::from_parts(*cid, data))),
            Reply::DontHave => Ok(None),
            Reply::Failed { reason } => Err(NetworkError::Remote { peer, reason }),
        }
    }
}

/// Answer one request frame out of `store`
async fn serve(store: &dyn Blockstore, frame: &[u8]) -> Result<Vec<u8>, NetworkError> {
    let Message::WantBlock { cid } = Message::from_frame(frame)?;
    let cid = decode_cid(&cid)?;
    let reply = match store.get(&cid).await {
        Ok(block) => Reply::Block {
            data: block.into_data(),
        },
        Err(BlockstoreError::NotFound(_)) => Reply::DontHave,
        Err(err) => {
            tracing::warn!(%cid, "serve: local store failed: {}", err);
            Reply::Failed {
                reason: err.to_string(),
            }
        }
    };
    reply.to_frame()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockstore::BlobsStore;
    use std::time::{Duration, Instant};

    async fn network_with_peer(delay: Delay) -> (VirtualNetwork, Block) {
        let network = VirtualNetwork::new(delay);
        let store = Arc::new(BlobsStore::memory().await.unwrap());
        let block = Block::new(b"served over the wire".to_vec());
        store.put(block.clone()).await.unwrap();
        network.register(PeerId::new(1), store).unwrap();
        (network, block)
    }

    #[tokio::test]
    async fn test_request_block() {
        let (network, block) = network_with_peer(Delay::none()).await;
        let adapter = network.adapter(PeerId::new(2));

        let fetched = adapter.request(PeerId::new(1), block.cid()).await.unwrap();
        assert_eq!(fetched, Some(block));

        let missing = Block::new(b"nobody has this".to_vec());
        let fetched = adapter
            .request(PeerId::new(1), missing.cid())
            .await
            .unwrap();
        assert_eq!(fetched, None);
    }

    #[tokio::test]
    async fn test_unknown_peer() {
        let (network, block) = network_with_peer(Delay::none()).await;
        let adapter = network.adapter(PeerId::new(2));
        let result = adapter.request(PeerId::new(9), block.cid()).await;
        assert!(matches!(result, Err(NetworkError::UnknownPeer(p)) if p == PeerId::new(9)));
    }

    #[tokio::test]
    async fn test_closed_network_rejects_requests() {
        let (network, block) = network_with_peer(Delay::none()).await;
        let adapter = network.adapter(PeerId::new(2));
        network.close();

        assert!(network.is_closed());
        assert!(network.peers().is_empty());
        let result = adapter.request(PeerId::new(1), block.cid()).await;
        assert!(matches!(result, Err(NetworkError::Closed)));
    }

    #[tokio::test]
    async fn test_round_trip_pays_network_delay() {
        let (network, block) = network_with_peer(Delay::fixed(Duration::from_millis(40))).await;
        let adapter = network.adapter(PeerId::new(2));

        let start = Instant::now();
        adapter.request(PeerId::new(1), block.cid()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
