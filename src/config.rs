//! Configuration for the proxy pool.

use std::time::Duration;

/// Configuration for the proxy pool.
#[derive(Debug, Clone)]
pub struct ProxyPoolConfig {
    /// Source URLs or file paths to fetch proxy lists from.
    pub sources: Vec<String>,
    /// Maximum number of proxies requested per refill.
    pub capacity: usize,
    /// How long a fetched proxy stays usable.
    pub proxy_ttl: Duration,
    /// Timeout for a single request through a proxy.
    pub request_timeout: Duration,
    /// Number of times to retry a request with different proxies.
    pub retry_count: usize,
    /// Delay between two attempts.
    pub retry_interval: Duration,
    /// Maximum requests per second per proxy, unlimited when `None`.
    pub max_requests_per_second: Option<f64>,
}

impl ProxyPoolConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProxyPoolConfigBuilder {
        ProxyPoolConfigBuilder::new()
    }
}

/// Builder for `ProxyPoolConfig`.
pub struct ProxyPoolConfigBuilder {
    sources: Vec<String>,
    capacity: Option<usize>,
    proxy_ttl: Option<Duration>,
    request_timeout: Option<Duration>,
    retry_count: Option<usize>,
    retry_interval: Option<Duration>,
    max_requests_per_second: Option<f64>,
}

impl ProxyPoolConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            capacity: None,
            proxy_ttl: None,
            request_timeout: None,
            retry_count: None,
            retry_interval: None,
            max_requests_per_second: None,
        }
    }

    /// Set the source URLs or file paths to fetch proxy lists from.
    pub fn sources(mut self, sources: Vec<impl Into<String>>) -> Self {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Set the maximum number of proxies requested per refill.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set how long a fetched proxy stays usable.
    pub fn proxy_ttl(mut self, ttl: Duration) -> Self {
        self.proxy_ttl = Some(ttl);
        self
    }

    /// Set the timeout for a single request through a proxy.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the number of times to retry a request with different proxies.
    pub fn retry_count(mut self, count: usize) -> Self {
        self.retry_count = Some(count);
        self
    }

    /// Set the delay between two attempts.
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = Some(interval);
        self
    }

    /// Set the maximum requests per second per proxy.
    pub fn max_requests_per_second(mut self, rps: f64) -> Self {
        self.max_requests_per_second = Some(rps);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ProxyPoolConfig {
        ProxyPoolConfig {
            sources: self.sources,
            capacity: self.capacity.unwrap_or(10),
            proxy_ttl: self.proxy_ttl.unwrap_or(Duration::from_secs(300)),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(10)),
            retry_count: self.retry_count.unwrap_or(3),
            retry_interval: self.retry_interval.unwrap_or(Duration::from_secs(1)),
            max_requests_per_second: self.max_requests_per_second,
        }
    }
}

impl Default for ProxyPoolConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
