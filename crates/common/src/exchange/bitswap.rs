use std::sync::Arc;

use async_trait::async_trait;

use super::{ContentRouting, Exchange, ExchangeError, NetworkError, PeerId, Transport};
use crate::blockstore::{Blockstore, BlockstoreError};
use crate::cancel::{until_cancelled, CancellationToken};
use crate::linked_data::{Block, Cid};

/// Exchange that falls back to providers found through routing.
///
/// Fetched blocks are verified against the requested cid before they
///  are stored locally and re-advertised, so a lying provider can't
///  poison the local store.
#[derive(Debug, Clone)]
pub struct BlockExchange {
    peer: PeerId,
    blockstore: Arc<dyn Blockstore>,
    routing: Arc<dyn ContentRouting>,
    transport: Arc<dyn Transport>,
}

/// What the providers said when none of them delivered
#[derive(Default)]
struct Misses {
    dont_have: usize,
    corrupt: usize,
    last_error: Option<NetworkError>,
}

impl BlockExchange {
    pub fn new(
        peer: PeerId,
        blockstore: Arc<dyn Blockstore>,
        routing: Arc<dyn ContentRouting>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            peer,
            blockstore,
            routing,
            transport,
        }
    }

    pub fn peer(&self) -> PeerId {
        self.peer
    }

    pub fn blockstore(&self) -> &Arc<dyn Blockstore> {
        &self.blockstore
    }

    async fn fetch(&self, cid: &Cid) -> Result<Block, ExchangeError> {
        match self.blockstore.get(cid).await {
            Ok(block) => return Ok(block),
            Err(BlockstoreError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }

        let providers = self.routing.find_providers(cid).await?;
        tracing::debug!(
            peer = %self.peer,
            %cid,
            providers = providers.len(),
            "BlockExchange::fetch: local miss"
        );

        let mut misses = Misses::default();
        for provider in providers.into_iter().filter(|p| *p != self.peer) {
            match self.transport.request(provider, cid).await {
                Ok(Some(block)) if block.verify() => {
                    self.store_fetched(block.clone()).await?;
                    tracing::debug!(peer = %self.peer, %provider, %cid, "BlockExchange::fetch: fetched");
                    return Ok(block);
                }
                Ok(Some(_)) => {
                    tracing::warn!(peer = %self.peer, %provider, %cid, "provider sent a block that does not match its cid");
                    misses.corrupt += 1;
                }
                Ok(None) => misses.dont_have += 1,
                Err(err) => {
                    tracing::warn!(peer = %self.peer, %provider, %cid, "request to provider failed: {}", err);
                    misses.last_error = Some(err);
                }
            }
        }

        Err(match misses {
            Misses { corrupt, .. } if corrupt > 0 => ExchangeError::Corrupt(*cid),
            Misses {
                dont_have: 0,
                last_error: Some(err),
                ..
            } => ExchangeError::Network(err),
            _ => ExchangeError::NotFound(*cid),
        })
    }

    async fn store_fetched(&self, block: Block) -> Result<(), ExchangeError> {
        let cid = *block.cid();
        self.blockstore.put(block).await?;
        // the block is already local, a failed announcement only costs other peers a provider
        if let Err(err) = self.routing.advertise(&cid).await {
            tracing::warn!(peer = %self.peer, %cid, "failed to advertise fetched block: {}", err);
        }
        Ok(())
    }
}

#[async_trait]
impl Exchange for BlockExchange {
    async fn get_block(
        &self,
        cid: &Cid,
        cancel: &CancellationToken,
    ) -> Result<Block, ExchangeError> {
        match until_cancelled(cancel, self.fetch(cid)).await {
            Some(result) => result,
            None => {
                tracing::debug!(peer = %self.peer, %cid, "BlockExchange::get_block: cancelled");
                Err(ExchangeError::Cancelled(*cid))
            }
        }
    }

    async fn put_block(&self, block: Block) -> Result<(), ExchangeError> {
        let cid = *block.cid();
        self.blockstore.put(block).await?;
        self.routing.advertise(&cid).await?;
        tracing::trace!(peer = %self.peer, %cid, "BlockExchange::put_block: stored and advertised");
        Ok(())
    }

    async fn has_block(&self, cid: &Cid) -> Result<bool, ExchangeError> {
        Ok(self.blockstore.has(cid).await?)
    }

    async fn provide(&self, cid: &Cid) -> Result<(), ExchangeError> {
        self.routing.advertise(cid).await?;
        tracing::trace!(peer = %self.peer, %cid, "BlockExchange::provide: advertised");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockstore::BlobsStore;
    use crate::delay::Delay;
    use crate::error::ErrorKind;
    use crate::exchange::{MockRouting, VirtualNetwork};
    use bytes::Bytes;
    use std::time::Duration;

    struct Net {
        network: VirtualNetwork,
        routing: MockRouting,
    }

    impl Net {
        fn new() -> Self {
            Self {
                network: VirtualNetwork::new(Delay::none()),
                routing: MockRouting::new(Delay::none()),
            }
        }

        async fn exchange(&self, id: u64) -> BlockExchange {
            let peer = PeerId::new(id);
            let store: Arc<dyn Blockstore> = Arc::new(BlobsStore::memory().await.unwrap());
            self.network.register(peer, store.clone()).unwrap();
            BlockExchange::new(
                peer,
                store,
                Arc::new(self.routing.client(peer)),
                Arc::new(self.network.adapter(peer)),
            )
        }
    }

    #[tokio::test]
    async fn test_fetch_from_provider() {
        let net = Net::new();
        let alice = net.exchange(1).await;
        let bob = net.exchange(2).await;
        let cancel = CancellationToken::new();

        let block = Block::new(b"shared block".to_vec());
        alice.put_block(block.clone()).await.unwrap();
        assert!(!bob.has_block(block.cid()).await.unwrap());

        let fetched = bob.get_block(block.cid(), &cancel).await.unwrap();
        assert_eq!(fetched, block);
        assert!(bob.has_block(block.cid()).await.unwrap());

        // bob now provides it too
        let client = net.routing.client(PeerId::new(3));
        let providers = client.find_providers(block.cid()).await.unwrap();
        assert_eq!(providers, vec![PeerId::new(1), PeerId::new(2)]);
    }

    #[tokio::test]
    async fn test_not_found_without_providers() {
        let net = Net::new();
        let bob = net.exchange(2).await;
        let cancel = CancellationToken::new();

        let block = Block::new(b"nobody".to_vec());
        let err = bob.get_block(block.cid(), &cancel).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound(c) if c == *block.cid()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_corrupt_provider_is_rejected() {
        let net = Net::new();
        let bob = net.exchange(2).await;
        let cancel = CancellationToken::new();

        // a peer whose store hands back the wrong bytes for a cid
        #[derive(Debug)]
        struct Liar;

        #[async_trait]
        impl Blockstore for Liar {
            async fn put(&self, _block: Block) -> Result<(), BlockstoreError> {
                Ok(())
            }
            async fn get(&self, cid: &Cid) -> Result<Block, BlockstoreError> {
                Ok(Block::from_parts(*cid, Bytes::from_static(b"forged")))
            }
            async fn has(&self, _cid: &Cid) -> Result<bool, BlockstoreError> {
                Ok(true)
            }
        }

        let liar = PeerId::new(9);
        net.network.register(liar, Arc::new(Liar)).unwrap();
        let block = Block::new(b"genuine".to_vec());
        net.routing.client(liar).advertise(block.cid()).await.unwrap();

        let err = bob.get_block(block.cid(), &cancel).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert!(!bob.has_block(block.cid()).await.unwrap());
    }

    #[tokio::test]
    async fn test_cancel_leaves_nothing_behind() {
        let net = Net::new();
        let alice = net.exchange(1).await;
        let bob = net.exchange(2).await;
        net.network.delay().set(Duration::from_secs(30));

        let block = Block::new(b"slow transfer".to_vec());
        alice.put_block(block.clone()).await.unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let start = std::time::Instant::now();
        let err = bob.get_block(block.cid(), &cancel).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!bob.has_block(block.cid()).await.unwrap());
    }
}
