//! Proxy fetcher that reads proxy lists from URLs and files.

use crate::config::ProxyPoolConfig;
use crate::proxy::{ProxyEntry, ProxyFetcher, ReqwestExecutor};
use crate::utils;

use anyhow::bail;
use async_trait::async_trait;
use futures::future;
use log::{info, warn};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Builds [`ReqwestExecutor`] entries from the proxy lists of the configured sources.
pub struct SourceFetcher {
    sources: Vec<String>,
    client: reqwest::Client,
    proxy_ttl: Duration,
    request_timeout: Duration,
    max_requests_per_second: Option<f64>,
}

impl SourceFetcher {
    pub fn new(config: &ProxyPoolConfig) -> Self {
        Self {
            sources: config.sources.clone(),
            client: reqwest::Client::new(),
            proxy_ttl: config.proxy_ttl,
            request_timeout: config.request_timeout,
            max_requests_per_second: config.max_requests_per_second,
        }
    }

    /// Collect the unique proxy URLs of all sources.
    ///
    /// Fails only when every source failed.
    async fn collect_urls(&self) -> anyhow::Result<Vec<String>> {
        let results = future::join_all(
            self.sources
                .iter()
                .map(|source| utils::fetch_proxies_from_source(&self.client, source)),
        )
        .await;

        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        let mut failures = 0;

        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(source_proxies) => {
                    info!("Fetched {} proxies from {}", source_proxies.len(), source);
                    urls.extend(source_proxies.into_iter().filter(|url| seen.insert(url.clone())));
                }
                Err(e) => {
                    warn!("Failed to fetch proxies from {}: {}", source, e);
                    failures += 1;
                }
            }
        }

        if !self.sources.is_empty() && failures == self.sources.len() {
            bail!("all {} proxy sources failed", failures);
        }
        Ok(urls)
    }
}

#[async_trait]
impl ProxyFetcher<ReqwestExecutor> for SourceFetcher {
    async fn fetch(&self, count: usize) -> anyhow::Result<Vec<ProxyEntry<ReqwestExecutor>>> {
        let mut urls = self.collect_urls().await?;
        urls.shuffle(&mut rand::rng());

        let expiration = Instant::now() + self.proxy_ttl;
        let mut entries = Vec::with_capacity(count.min(urls.len()));

        for url in urls {
            if entries.len() >= count {
                break;
            }
            let executor = match ReqwestExecutor::for_proxy(&url, self.request_timeout) {
                Ok(executor) => executor,
                Err(e) => {
                    warn!("Failed to create proxy from {}: {}", url, e);
                    continue;
                }
            };
            let executor = match self.max_requests_per_second {
                Some(rps) => executor.with_rate_limit(rps),
                None => executor,
            };
            entries.push(ProxyEntry::new(url, executor, expiration));
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_list(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.txt", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    fn fetcher_for(sources: Vec<String>) -> SourceFetcher {
        let config = ProxyPoolConfig::builder()
            .sources(sources)
            .proxy_ttl(Duration::from_secs(60))
            .max_requests_per_second(2.0)
            .build();
        SourceFetcher::new(&config)
    }

    #[tokio::test]
    async fn test_fetch_dedups_and_limits() {
        let a = write_list("fetch-a", "1.1.1.1:1080\n2.2.2.2:1080\n");
        let b = write_list("fetch-b", "2.2.2.2:1080\n3.3.3.3:1080\n");
        let fetcher = fetcher_for(vec![a.display().to_string(), b.display().to_string()]);

        let all = fetcher.fetch(10).await.unwrap();
        let labels: HashSet<_> = all.iter().map(|e| e.label().to_string()).collect();
        assert_eq!(labels.len(), 3);
        assert!(all.iter().all(|e| !e.is_expired_at(Instant::now())));

        assert_eq!(fetcher.fetch(2).await.unwrap().len(), 2);

        std::fs::remove_file(a).unwrap();
        std::fs::remove_file(b).unwrap();
    }

    #[tokio::test]
    async fn test_fetch_tolerates_one_bad_source() {
        let good = write_list("fetch-good", "1.1.1.1:1080\n");
        let fetcher = fetcher_for(vec![good.display().to_string(), "/nonexistent/list.txt".to_string()]);

        assert_eq!(fetcher.fetch(5).await.unwrap().len(), 1);
        std::fs::remove_file(good).unwrap();
    }

    #[tokio::test]
    async fn test_fetch_fails_when_all_sources_fail() {
        let fetcher = fetcher_for(vec!["/nonexistent/list.txt".to_string()]);
        assert!(fetcher.fetch(5).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let empty = write_list("fetch-empty", "# nothing here\n");
        let fetcher = fetcher_for(vec![empty.display().to_string()]);

        assert!(fetcher.fetch(5).await.unwrap().is_empty());
        std::fs::remove_file(empty).unwrap();
    }

    #[tokio::test]
    async fn test_zero_ttl_pool_fetches_once() {
        use crate::error::PoolError;
        use crate::pool::ProxyPool;

        let list = write_list("fetch-zero-ttl", "1.1.1.1:1080\n");
        let config = ProxyPoolConfig::builder()
            .sources(vec![list.display().to_string()])
            .proxy_ttl(Duration::ZERO)
            .build();
        let pool = ProxyPool::<ReqwestExecutor>::new(config.capacity, SourceFetcher::new(&config));

        let result = tokio::time::timeout(Duration::from_secs(5), pool.acquire()).await;
        assert!(matches!(result, Ok(Err(PoolError::NoProxiesAvailable))));
        assert_eq!(pool.get_stats().refills, 0);
        assert!(pool.is_empty());

        std::fs::remove_file(list).unwrap();
    }
}
