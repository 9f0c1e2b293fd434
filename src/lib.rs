//! # reqwest-proxy-dispatch
//!
//! A rotating proxy pool and retrying dispatch client for reqwest.
//!
//! The pool hands out a random live proxy per request, drops proxies that
//! expire or fail, and refills itself from a pluggable [`ProxyFetcher`] when it
//! runs empty. [`DispatchClient`] sends a request through one pooled proxy and
//! [`RetryingClient`] retries whole dispatches with a delay in between.
//! [`ProxyPoolMiddleware`] wires all of it into a `reqwest_middleware` stack.

pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod middleware;
pub mod pool;
pub mod proxy;
pub mod retry;
mod utils;

#[cfg(test)]
mod testing;

pub use client::DispatchClient;
pub use config::{ProxyPoolConfig, ProxyPoolConfigBuilder};
pub use error::{DispatchError, PoolError};
pub use fetcher::SourceFetcher;
pub use middleware::ProxyPoolMiddleware;
pub use pool::{PoolStats, ProxyPool};
pub use proxy::{Executor, ProxyEntry, ProxyFetcher, ReqwestExecutor};
pub use retry::{Backoff, RetryingClient, Sleeper, TokioSleeper};
