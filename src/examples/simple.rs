//! Simple example of using reqwest-proxy-dispatch.

use reqwest_middleware::ClientBuilder;
use reqwest_proxy_dispatch::{ProxyPoolConfig, ProxyPoolMiddleware};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ProxyPoolConfig::builder()
        // free socks5 proxy urls, format like `Free-Proxy`
        .sources(vec![
            "https://cdn.jsdelivr.net/gh/dpangestuw/Free-Proxy@main/socks5_proxies.txt",
            "https://cdn.jsdelivr.net/gh/proxifly/free-proxy-list@main/proxies/protocols/socks5/data.txt"
        ])
        .capacity(20)
        .proxy_ttl(Duration::from_secs(120))
        .request_timeout(Duration::from_secs(5))
        .retry_count(5)
        .retry_interval(Duration::from_millis(500))
        // rate limit for each proxy, lower performance but avoid banned
        .max_requests_per_second(3.0)
        .build();

    let proxy_pool = ProxyPoolMiddleware::new(config);
    let pool = proxy_pool.pool().clone();

    let client = ClientBuilder::new(reqwest::Client::new())
        .with(proxy_pool)
        .build();

    println!("Sending request...");
    let response = client.get("https://httpbin.org/ip").send().await?;

    println!("Status: {}", response.status());
    println!("Response: {}", response.text().await?);
    println!("Pool: {:?}", pool.get_stats());

    Ok(())
}
