//! Core proxy pool implementation.

use crate::error::PoolError;
use crate::proxy::{Executor, ProxyEntry, ProxyFetcher};

use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters describing what the pool has done so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Entries currently in the pool.
    pub live: usize,
    /// Entries removed after a transport failure.
    pub evictions: usize,
    /// Entries removed because they expired.
    pub expirations: usize,
    /// Fetches that added at least one entry.
    pub refills: usize,
}

/// A rotating pool of proxies that refills itself from a [`ProxyFetcher`].
///
/// Entries are shared: [`acquire`](Self::acquire) hands out an `Arc` and the
/// pool keeps tracking the entry until it expires or is evicted.
pub struct ProxyPool<E: Executor> {
    /// Live entries. Never held across an await.
    entries: Mutex<Vec<Arc<ProxyEntry<E>>>>,
    /// Serializes fetches without blocking selection from a non-empty pool.
    refill: tokio::sync::Mutex<()>,
    /// Batch size requested from the fetcher per refill.
    capacity: usize,
    fetcher: Box<dyn ProxyFetcher<E>>,
    evictions: AtomicUsize,
    expirations: AtomicUsize,
    refills: AtomicUsize,
}

impl<E: Executor> ProxyPool<E> {
    /// Create an empty pool. Nothing is fetched until the first acquisition.
    pub fn new(capacity: usize, fetcher: impl ProxyFetcher<E> + 'static) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            refill: tokio::sync::Mutex::new(()),
            capacity,
            fetcher: Box::new(fetcher),
            evictions: AtomicUsize::new(0),
            expirations: AtomicUsize::new(0),
            refills: AtomicUsize::new(0),
        }
    }

    /// Add entries directly, bypassing the fetcher.
    pub fn seed(&self, entries: impl IntoIterator<Item = ProxyEntry<E>>) {
        let mut live = self.entries.lock();
        live.extend(entries.into_iter().map(Arc::new));
    }

    /// Get a live proxy, refilling the pool from the fetcher when it is empty.
    ///
    /// Expired entries met along the way are dropped and selection retries.
    /// Fetch errors and empty fetches are returned, never retried here.
    pub async fn acquire(&self) -> Result<Arc<ProxyEntry<E>>, PoolError> {
        loop {
            if let Some(entry) = self.select_live() {
                return Ok(entry);
            }

            let _refill = self.refill.lock().await;
            // Another caller may have refilled while we waited on the gate.
            let refilled = !self.entries.lock().is_empty();
            if refilled {
                continue;
            }

            debug!("Proxy pool empty, fetching up to {} proxies", self.capacity);
            let fetched = self.fetcher.fetch(self.capacity).await.map_err(|e| {
                warn!("Failed to fetch proxies: {}", e);
                PoolError::FetchFailed(e)
            })?;

            let total = fetched.len();
            let now = Instant::now();
            let fresh: Vec<_> = fetched.into_iter().filter(|e| !e.is_expired_at(now)).collect();
            if fresh.len() < total {
                self.expirations.fetch_add(total - fresh.len(), Ordering::Relaxed);
                debug!("Dropped {} already expired proxies from fetch", total - fresh.len());
            }

            if fresh.is_empty() {
                warn!("Proxy fetcher returned no live proxies ({} fetched)", total);
                return Err(PoolError::NoProxiesAvailable);
            }

            info!("Fetched {} proxies into pool", fresh.len());
            self.refills.fetch_add(1, Ordering::Relaxed);
            self.seed(fresh);
        }
    }

    /// Pick a random non-expired entry, dropping expired picks.
    fn select_live(&self) -> Option<Arc<ProxyEntry<E>>> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        let mut rng = rand::rng();

        while !entries.is_empty() {
            let index = rng.random_range(0..entries.len());
            if !entries[index].is_expired_at(now) {
                return Some(Arc::clone(&entries[index]));
            }

            let expired = entries.swap_remove(index);
            self.expirations.fetch_add(1, Ordering::Relaxed);
            debug!("Proxy {} expired, removed from pool", expired.label());
        }
        None
    }

    /// Remove `entry` from the pool. Returns whether it was still present.
    pub fn evict(&self, entry: &Arc<ProxyEntry<E>>) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|e| Arc::ptr_eq(e, entry)) {
            Some(index) => {
                entries.swap_remove(index);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                info!("Proxy {} evicted, {} left in pool", entry.label(), entries.len());
                true
            }
            None => false,
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|e| !e.is_expired_at(now));

        let removed = before - entries.len();
        self.expirations.fetch_add(removed, Ordering::Relaxed);
        removed
    }

    /// Whether `entry` is still in the pool.
    pub fn contains(&self, entry: &Arc<ProxyEntry<E>>) -> bool {
        self.entries.lock().iter().any(|e| Arc::ptr_eq(e, entry))
    }

    /// Number of entries currently in the pool.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the pool holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Batch size requested from the fetcher per refill.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get statistics about the proxy pool.
    pub fn get_stats(&self) -> PoolStats {
        PoolStats {
            live: self.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            refills: self.refills.load(Ordering::Relaxed),
        }
    }
}
