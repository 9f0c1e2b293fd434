//! Middleware implementation for reqwest.

use crate::config::ProxyPoolConfig;
use crate::error::DispatchError;
use crate::fetcher::SourceFetcher;
use crate::pool::ProxyPool;
use crate::proxy::ReqwestExecutor;
use crate::retry::RetryingClient;

use anyhow::anyhow;
use async_trait::async_trait;
use log::info;
use reqwest_middleware::{Error, Middleware, Next, Result};
use std::sync::Arc;
use std::time::Duration;

/// Middleware that sends every request through a rotating pool of proxies.
///
/// The wrapped client's own stack (`Next`) is not used: each request goes out
/// through the client bound to the selected proxy.
#[derive(Clone)]
pub struct ProxyPoolMiddleware {
    client: RetryingClient<ReqwestExecutor>,
    retry_count: usize,
    retry_interval: Duration,
}

impl ProxyPoolMiddleware {
    /// Create a middleware whose pool refills from the configured sources.
    ///
    /// No proxy is fetched until the first request.
    pub fn new(config: ProxyPoolConfig) -> Self {
        info!(
            "Proxy pool configured with {} sources, capacity {}",
            config.sources.len(),
            config.capacity
        );
        let pool = Arc::new(ProxyPool::new(config.capacity, SourceFetcher::new(&config)));
        Self::with_pool(pool, &config)
    }

    /// Create a middleware on top of an existing pool.
    pub fn with_pool(pool: Arc<ProxyPool<ReqwestExecutor>>, config: &ProxyPoolConfig) -> Self {
        Self {
            client: RetryingClient::new(pool),
            retry_count: config.retry_count,
            retry_interval: config.retry_interval,
        }
    }

    /// The underlying proxy pool.
    pub fn pool(&self) -> &Arc<ProxyPool<ReqwestExecutor>> {
        self.client.client().pool()
    }
}

/// Surface transport errors from reqwest as such, everything else as middleware errors.
fn into_middleware_error(err: DispatchError) -> Error {
    match err {
        DispatchError::Transport { proxy, source } => match source.downcast::<reqwest::Error>() {
            Ok(e) => Error::Reqwest(e),
            Err(source) => Error::Middleware(anyhow!(DispatchError::Transport { proxy, source })),
        },
        err => Error::Middleware(anyhow!(err)),
    }
}

#[async_trait]
impl Middleware for ProxyPoolMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        _extensions: &mut http::Extensions,
        _next: Next<'_>,
    ) -> Result<reqwest::Response> {
        // A request that cannot be resent says nothing about the proxy.
        if req.try_clone().is_none() {
            return Err(Error::Middleware(anyhow!(
                "Request object is not cloneable. Are you passing a streaming body?"
            )));
        }

        self.client
            .dispatch_with_retry(&req, self.retry_count, self.retry_interval)
            .await
            .map_err(into_middleware_error)
    }
}
