//! Utility functions for reading proxy lists.

use reqwest::Client;
use url::Url;

const PROXY_SCHEMES: [&str; 4] = ["http", "https", "socks5", "socks5h"];

/// Whether `source` is an HTTP(S) URL rather than a file path.
fn is_remote_source(source: &str) -> bool {
    Url::parse(source)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Fetch and parse a list of proxies from a URL or file path.
pub(crate) async fn fetch_proxies_from_source(client: &Client, source: &str) -> anyhow::Result<Vec<String>> {
    let content = if is_remote_source(source) {
        client.get(source).send().await?.error_for_status()?.text().await?
    } else {
        tokio::fs::read_to_string(source).await?
    };
    Ok(parse_proxy_list(&content))
}

/// Parse the text content to extract proxy URLs.
///
/// Bare `IP:PORT` lines are treated as SOCKS5 proxies.
pub(crate) fn parse_proxy_list(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            let candidate = if line.contains("://") {
                line.to_string()
            } else {
                format!("socks5://{}", line)
            };

            let url = Url::parse(&candidate).ok()?;
            if !PROXY_SCHEMES.contains(&url.scheme()) || url.host_str().is_none() || url.port_or_known_default().is_none() {
                return None;
            }
            Some(candidate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proxy_list() {
        let content = "\
# free proxies
socks5://1.2.3.4:1080
5.6.7.8:3128

http://9.9.9.9:8080
ftp://1.1.1.1:21
not-a-proxy
10.0.0.1
";
        assert_eq!(
            parse_proxy_list(content),
            vec!["socks5://1.2.3.4:1080", "socks5://5.6.7.8:3128", "http://9.9.9.9:8080"]
        );
    }

    #[test]
    fn test_remote_source_detection() {
        assert!(is_remote_source("https://cdn.example.com/socks5.txt"));
        assert!(is_remote_source("http://127.0.0.1:8000/list"));
        assert!(!is_remote_source("http_proxies.txt"));
        assert!(!is_remote_source("https-list.txt"));
        assert!(!is_remote_source("/var/lib/proxies/http.txt"));
    }

    #[tokio::test]
    async fn test_fetch_from_file() {
        let path = std::env::temp_dir().join(format!("proxy-list-{}.txt", std::process::id()));
        tokio::fs::write(&path, "1.2.3.4:1080\n# comment\n").await.unwrap();

        let proxies = fetch_proxies_from_source(&Client::new(), path.to_str().unwrap()).await.unwrap();
        assert_eq!(proxies, vec!["socks5://1.2.3.4:1080"]);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        assert!(fetch_proxies_from_source(&Client::new(), "/nonexistent/proxies.txt").await.is_err());
    }
}
