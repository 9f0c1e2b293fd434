//! Bounded retry over whole dispatch attempts.

use crate::client::DispatchClient;
use crate::error::DispatchError;
use crate::pool::ProxyPool;
use crate::proxy::Executor;

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// Delay between two attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Wait the same interval before every retry.
    Fixed(Duration),
    /// Wait `base * 2^attempt`, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay after the failed attempt number `attempt` (zero-based).
    pub fn delay(&self, attempt: usize) -> Duration {
        match *self {
            Backoff::Fixed(interval) => interval,
            Backoff::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(attempt.min(u32::MAX as usize) as u32);
                base.saturating_mul(factor).min(max)
            }
        }
    }
}

/// Suspends the current call chain between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// [`DispatchClient`] wrapper that retries failed dispatches.
///
/// Every attempt acquires a fresh proxy, so a proxy evicted by a failed
/// attempt is never reused by the next one.
pub struct RetryingClient<E: Executor> {
    client: DispatchClient<E>,
    sleeper: Arc<dyn Sleeper>,
}

impl<E: Executor> Clone for RetryingClient<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            sleeper: Arc::clone(&self.sleeper),
        }
    }
}

impl<E: Executor> RetryingClient<E> {
    pub fn new(pool: Arc<ProxyPool<E>>) -> Self {
        Self {
            client: DispatchClient::new(pool),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the delay function used between attempts.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// The wrapped single-attempt client.
    pub fn client(&self) -> &DispatchClient<E> {
        &self.client
    }

    /// Dispatch with up to `max_retries` retries, `interval` apart.
    ///
    /// `max_retries = 0` means exactly one attempt. When every attempt
    /// fails, the error of the last attempt is returned.
    pub async fn dispatch_with_retry(
        &self,
        request: &E::Request,
        max_retries: usize,
        interval: Duration,
    ) -> Result<E::Response, DispatchError> {
        self.dispatch_with_backoff(request, max_retries, Backoff::Fixed(interval)).await
    }

    /// Like [`dispatch_with_retry`](Self::dispatch_with_retry) with a custom delay strategy.
    pub async fn dispatch_with_backoff(
        &self,
        request: &E::Request,
        max_retries: usize,
        backoff: Backoff,
    ) -> Result<E::Response, DispatchError> {
        let mut attempt = 0;

        loop {
            match self.client.dispatch(request).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt >= max_retries => {
                    warn!("Request failed after {} attempts: {}", attempt + 1, err);
                    return Err(err);
                }
                Err(err) => {
                    let delay = backoff.delay(attempt);
                    debug!("Attempt {} failed: {}. Retrying in {:?}", attempt + 1, err, delay);
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
