use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::PeerId;
use crate::delay::{Delay, Delayed};
use crate::linked_data::Cid;

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("routing substrate is closed")]
    Closed,
}

/// Provider discovery, as seen by one peer
#[async_trait]
pub trait ContentRouting: Send + Sync + std::fmt::Debug {
    /// Peers that claim to hold the block, in a stable order
    async fn find_providers(&self, cid: &Cid) -> Result<Vec<PeerId>, RoutingError>;

    /// Announce that the local peer holds the block
    async fn advertise(&self, cid: &Cid) -> Result<(), RoutingError>;
}

#[async_trait]
impl<R: ContentRouting> ContentRouting for Delayed<R> {
    async fn find_providers(&self, cid: &Cid) -> Result<Vec<PeerId>, RoutingError> {
        self.after_delay().await.find_providers(cid).await
    }

    async fn advertise(&self, cid: &Cid) -> Result<(), RoutingError> {
        self.after_delay().await.advertise(cid).await
    }
}

/// In-process provider table shared by every peer of a test network.
///  Each lookup and announcement pays the server's delay.
#[derive(Debug, Clone)]
pub struct MockRouting {
    inner: Arc<MockRoutingInner>,
    delay: Delay,
}

#[derive(Debug, Default)]
struct MockRoutingInner {
    providers: RwLock<HashMap<Cid, BTreeSet<PeerId>>>,
    closed: AtomicBool,
}

impl MockRouting {
    pub fn new(delay: Delay) -> Self {
        Self {
            inner: Arc::new(MockRoutingInner::default()),
            delay,
        }
    }

    pub fn delay(&self) -> &Delay {
        &self.delay
    }

    /// A routing handle that advertises as `peer`
    pub fn client(&self, peer: PeerId) -> Delayed<RoutingClient> {
        let client = RoutingClient {
            peer,
            inner: self.inner.clone(),
        };
        Delayed::new(client, self.delay.clone())
    }

    /// Drop every record advertised by `peer`
    pub fn forget(&self, peer: PeerId) {
        let mut providers = self.inner.providers.write();
        providers.retain(|_, peers| {
            peers.remove(&peer);
            !peers.is_empty()
        });
    }

    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.providers.write().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

/// One peer's view of a [`MockRouting`] server
#[derive(Debug, Clone)]
pub struct RoutingClient {
    peer: PeerId,
    inner: Arc<MockRoutingInner>,
}

impl RoutingClient {
    pub fn peer(&self) -> PeerId {
        self.peer
    }

    fn check_open(&self) -> Result<(), RoutingError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(RoutingError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl ContentRouting for RoutingClient {
    async fn find_providers(&self, cid: &Cid) -> Result<Vec<PeerId>, RoutingError> {
        self.check_open()?;
        let providers = self
            .inner
            .providers
            .read()
            .get(cid)
            .map(|peers| peers.iter().copied().collect())
            .unwrap_or_default();
        Ok(providers)
    }

    async fn advertise(&self, cid: &Cid) -> Result<(), RoutingError> {
        self.check_open()?;
        self.inner
            .providers
            .write()
            .entry(*cid)
            .or_default()
            .insert(self.peer);
        Ok(())
    }
}
