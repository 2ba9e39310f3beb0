use std::sync::Arc;
use std::time::Duration;

use super::{BlockExchange, Exchange, MockRouting, NetworkError, PeerId, VirtualNetwork};
use crate::blockstore::{BlobsStore, BlobsStoreError, Blockstore};
use crate::dag::DagService;
use crate::delay::{Delay, Delayed};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session generator is closed")]
    Closed,
    #[error("failed to open session blockstore: {0}")]
    BlobsStore(#[from] BlobsStoreError),
    #[error("failed to join network: {0}")]
    Network(#[from] NetworkError),
}

/// A logical peer: its own blockstore plus an exchange onto the
///  shared network and routing.
#[derive(Debug, Clone)]
pub struct Session {
    peer: PeerId,
    blockstore: Arc<Delayed<BlobsStore>>,
    exchange: Arc<BlockExchange>,
    network: VirtualNetwork,
    routing: MockRouting,
}

impl Session {
    pub fn peer(&self) -> PeerId {
        self.peer
    }

    /// The session's local store, latency included
    pub fn blockstore(&self) -> Arc<dyn Blockstore> {
        self.blockstore.clone()
    }

    pub fn exchange(&self) -> Arc<dyn Exchange> {
        self.exchange.clone()
    }

    pub fn dag(&self) -> DagService {
        DagService::new(self.exchange())
    }

    /// Latency applied to every access of this session's blockstore,
    ///  including accesses made by remote peers fetching from it
    pub fn set_blockstore_latency(&self, latency: Duration) {
        self.blockstore.delay().set(latency);
    }

    pub fn blockstore_latency(&self) -> Duration {
        self.blockstore.delay().get()
    }

    /// Leave the network and withdraw every advertisement
    pub fn close(&self) {
        self.network.unregister(self.peer);
        self.routing.forget(self.peer);
    }
}

/// Hands out sessions that share one network and one routing server.
///
/// Dropping the generator tears everything down, same as [`close`](Self::close).
#[derive(Debug)]
pub struct SessionGenerator {
    network: VirtualNetwork,
    routing: MockRouting,
    sessions: Vec<Session>,
    next_id: u64,
    closed: bool,
}

impl SessionGenerator {
    pub fn new(network: VirtualNetwork, routing: MockRouting) -> Self {
        Self {
            network,
            routing,
            sessions: Vec::new(),
            next_id: 1,
            closed: false,
        }
    }

    /// Generator over fresh substrates with the given latencies
    pub fn with_latency(network_latency: Duration, routing_latency: Duration) -> Self {
        Self::new(
            VirtualNetwork::new(Delay::fixed(network_latency)),
            MockRouting::new(Delay::fixed(routing_latency)),
        )
    }

    pub fn network(&self) -> &VirtualNetwork {
        &self.network
    }

    pub fn routing(&self) -> &MockRouting {
        &self.routing
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// New session over an in-memory store
    pub async fn next(&mut self) -> Result<Session, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        let store = BlobsStore::memory().await?;
        self.next_with_store(store)
    }

    /// New session over the given store
    pub fn next_with_store(&mut self, store: BlobsStore) -> Result<Session, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }

        let peer = PeerId::new(self.next_id);
        self.next_id += 1;

        let blockstore = Arc::new(Delayed::new(store, Delay::none()));
        self.network.register(peer, blockstore.clone())?;

        let exchange = BlockExchange::new(
            peer,
            blockstore.clone(),
            Arc::new(self.routing.client(peer)),
            Arc::new(self.network.adapter(peer)),
        );

        let session = Session {
            peer,
            blockstore,
            exchange: Arc::new(exchange),
            network: self.network.clone(),
            routing: self.routing.clone(),
        };
        self.sessions.push(session.clone());
        tracing::info!(%peer, "SessionGenerator::next: session opened");
        Ok(session)
    }

    /// Close every session and both substrates. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        for session in self.sessions.drain(..) {
            session.close();
        }
        self.network.close();
        self.routing.close();
        self.closed = true;
        tracing::info!("SessionGenerator::close: network and routing closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for SessionGenerator {
    fn drop(&mut self) {
        if !self.closed {
            tracing::debug!("SessionGenerator dropped without close, tearing down");
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::exchange::ExchangeError;
    use crate::linked_data::Block;

    #[tokio::test]
    async fn test_sessions_share_blocks() {
        let mut generator = SessionGenerator::with_latency(Duration::ZERO, Duration::ZERO);
        let adder = generator.next().await.unwrap();
        let catter = generator.next().await.unwrap();
        assert_ne!(adder.peer(), catter.peer());

        let block = Block::new(b"between sessions".to_vec());
        adder.exchange().put_block(block.clone()).await.unwrap();

        let cancel = CancellationToken::new();
        let fetched = catter
            .exchange()
            .get_block(block.cid(), &cancel)
            .await
            .unwrap();
        assert_eq!(fetched, block);
        generator.close();
    }

    #[tokio::test]
    async fn test_closed_generator() {
        let mut generator = SessionGenerator::with_latency(Duration::ZERO, Duration::ZERO);
        let adder = generator.next().await.unwrap();
        let catter = generator.next().await.unwrap();
        let block = Block::new(b"before close".to_vec());
        adder.exchange().put_block(block.clone()).await.unwrap();

        generator.close();
        generator.close();
        assert!(generator.is_closed());
        assert!(generator.sessions().is_empty());
        assert!(matches!(generator.next().await, Err(SessionError::Closed)));

        let cancel = CancellationToken::new();
        let err = catter
            .exchange()
            .get_block(block.cid(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Routing(_)));
    }

    #[tokio::test]
    async fn test_blockstore_latency_is_per_session() {
        let mut generator = SessionGenerator::with_latency(Duration::ZERO, Duration::ZERO);
        let adder = generator.next().await.unwrap();
        let catter = generator.next().await.unwrap();

        catter.set_blockstore_latency(Duration::from_millis(50));
        assert_eq!(catter.blockstore_latency(), Duration::from_millis(50));
        assert_eq!(adder.blockstore_latency(), Duration::ZERO);
    }
}
