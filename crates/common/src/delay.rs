//! Injectable latency.
//!
//! A [`Delay`] is a shared, adjustable duration; [`Delayed`] wraps any
//!  substrate (blockstore, routing, transport) and waits out the delay
//!  before each operation completes. Keeping the delay outside the
//!  substrates lets each latency source be tuned on its own.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

/// A latency value shared by every holder of a clone.
///  Setting it to zero disables the wait entirely.
#[derive(Debug, Clone, Default)]
pub struct Delay(Arc<RwLock<Duration>>);

impl Delay {
    pub fn fixed(duration: Duration) -> Self {
        Self(Arc::new(RwLock::new(duration)))
    }

    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn get(&self) -> Duration {
        *self.0.read()
    }

    /// Change the latency for every clone of this delay
    pub fn set(&self, duration: Duration) -> Duration {
        std::mem::replace(&mut *self.0.write(), duration)
    }

    /// Sleep for the current latency
    pub async fn wait(&self) {
        let duration = self.get();
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Decorator applying a [`Delay`] before every operation of `T`
#[derive(Debug, Clone)]
pub struct Delayed<T> {
    inner: T,
    delay: Delay,
}

impl<T> Delayed<T> {
    pub fn new(inner: T, delay: Delay) -> Self {
        Self { inner, delay }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn delay(&self) -> &Delay {
        &self.delay
    }

    /// Wait out the delay, then hand back the wrapped value
    pub async fn after_delay(&self) -> &T {
        self.delay.wait().await;
        &self.inner
    }
}
