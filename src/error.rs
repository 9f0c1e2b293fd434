//! Error types for the reqwest-proxy-dispatch crate.

use thiserror::Error;

/// Error returned when the pool cannot hand out a live proxy.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The fetcher itself failed while refilling an empty pool.
    #[error("failed to fetch proxies: {0}")]
    FetchFailed(#[source] anyhow::Error),

    /// The fetcher succeeded but returned no proxies.
    #[error("No proxy available in pool")]
    NoProxiesAvailable,
}

/// Error returned by a single dispatch through the pool.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No proxy could be acquired from the pool.
    #[error("failed to get proxy client: {0}")]
    Pool(#[from] PoolError),

    /// The request failed through the selected proxy, which has been evicted.
    #[error("failed to do request via {proxy}: {source}")]
    Transport {
        proxy: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// Whether the failure came from pool acquisition rather than the transport.
    pub fn is_pool(&self) -> bool {
        matches!(self, DispatchError::Pool(_))
    }

    /// Whether the failure came from the transport.
    pub fn is_transport(&self) -> bool {
        matches!(self, DispatchError::Transport { .. })
    }
}
