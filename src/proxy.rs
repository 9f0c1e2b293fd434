//! Proxy entries and the capabilities the pool is built on.

use anyhow::anyhow;
use async_trait::async_trait;
use governor::{clock::DefaultClock, middleware::NoOpMiddleware, state::{InMemoryState, NotKeyed}, Quota, RateLimiter};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Something that can perform a request through one upstream proxy.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    /// The request type. Taken by reference so a retry can resend it.
    type Request: Send + Sync;
    /// The response type.
    type Response: Send;

    /// Perform the request. Any error marks the proxy as bad.
    async fn execute(&self, request: &Self::Request) -> anyhow::Result<Self::Response>;
}

/// Source of fresh proxy entries, consulted when the pool runs empty.
#[async_trait]
pub trait ProxyFetcher<E: Executor>: Send + Sync {
    /// Return up to `count` new entries.
    ///
    /// An empty vector means nothing is available right now; it is not an error.
    async fn fetch(&self, count: usize) -> anyhow::Result<Vec<ProxyEntry<E>>>;
}

/// One pooled upstream proxy together with its expiration time.
pub struct ProxyEntry<E> {
    label: String,
    handle: E,
    expiration: Instant,
}

impl<E> ProxyEntry<E> {
    /// Create a new entry. `label` is only used for logging (usually the proxy URL).
    pub fn new(label: impl Into<String>, handle: E, expiration: Instant) -> Self {
        Self {
            label: label.into(),
            handle,
            expiration,
        }
    }

    /// The proxy label, e.g. "socks5://127.0.0.1:1080".
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The request executor bound to this proxy.
    pub fn handle(&self) -> &E {
        &self.handle
    }

    /// The instant after which this entry must not be used.
    pub fn expiration(&self) -> Instant {
        self.expiration
    }

    /// Whether the entry expired at or before `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expiration <= now
    }
}

impl<E> fmt::Debug for ProxyEntry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyEntry")
            .field("label", &self.label)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// A `reqwest::Client` bound to a single upstream proxy.
#[derive(Clone)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
    /// Rate limiter to control requests per second, if any.
    limiter: Option<Arc<DirectLimiter>>,
}

impl ReqwestExecutor {
    /// Wrap an already configured client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, limiter: None }
    }

    /// Build a client that sends every request through `proxy_url`.
    pub fn for_proxy(proxy_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .proxy(reqwest::Proxy::all(proxy_url)?)
            .timeout(timeout)
            .build()?;
        Ok(Self::new(client))
    }

    /// Limit requests through this proxy to `max_rps` per second.
    pub fn with_rate_limit(mut self, max_rps: f64) -> Self {
        let rps = NonZeroU32::new(max_rps.ceil() as u32).unwrap_or(NonZeroU32::MIN);
        self.limiter = Some(Arc::new(RateLimiter::direct(Quota::per_second(rps))));
        self
    }
}

#[async_trait]
impl Executor for ReqwestExecutor {
    type Request = reqwest::Request;
    type Response = reqwest::Response;

    async fn execute(&self, request: &reqwest::Request) -> anyhow::Result<reqwest::Response> {
        let request = request.try_clone().ok_or_else(|| {
            anyhow!("Request object is not cloneable. Are you passing a streaming body?")
        })?;

        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        Ok(self.client.execute(request).await?)
    }
}
