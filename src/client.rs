//! Single-attempt dispatch through the pool.

use crate::error::DispatchError;
use crate::pool::ProxyPool;
use crate::proxy::Executor;

use log::warn;
use std::sync::Arc;

/// Sends requests through proxies taken from a shared [`ProxyPool`].
pub struct DispatchClient<E: Executor> {
    pool: Arc<ProxyPool<E>>,
}

impl<E: Executor> Clone for DispatchClient<E> {
    fn clone(&self) -> Self {
        Self { pool: Arc::clone(&self.pool) }
    }
}

impl<E: Executor> DispatchClient<E> {
    pub fn new(pool: Arc<ProxyPool<E>>) -> Self {
        Self { pool }
    }

    /// The pool this client draws proxies from.
    pub fn pool(&self) -> &Arc<ProxyPool<E>> {
        &self.pool
    }

    /// Send `request` through one pooled proxy.
    ///
    /// A transport failure evicts the proxy before the error is returned;
    /// on success the proxy stays in the pool.
    pub async fn dispatch(&self, request: &E::Request) -> Result<E::Response, DispatchError> {
        let entry = self.pool.acquire().await?;

        match entry.handle().execute(request).await {
            Ok(response) => Ok(response),
            Err(source) => {
                warn!("Request failed with proxy {}: {}", entry.label(), source);
                self.pool.evict(&entry);
                Err(DispatchError::Transport {
                    proxy: entry.label().to_string(),
                    source,
                })
            }
        }
    }
}
