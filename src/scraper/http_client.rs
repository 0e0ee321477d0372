use crate::config::ScraperConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::error::FetchError;
use super::PageFetcher;

pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Shopify sets session cookies on the first listing page
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { inner })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    /// Single attempt; any non-2xx status or timeout is a failure.
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let to_fetch_error = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Request { url: url.to_string(), source: e }
            }
        };

        let resp = self.inner.get(url).send().await.map_err(to_fetch_error)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(to_fetch_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client(timeout_secs: u64) -> HttpClient {
        let config = ScraperConfig {
            timeout_secs,
            ..ScraperConfig::default()
        };
        HttpClient::new(&config).unwrap()
    }

    /// Local server answering every request with `response`.
    /// With `None` it reads the request and never replies.
    async fn serve(response: Option<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    match response {
                        Some(r) => {
                            let _ = socket.write_all(r.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        }
                        None => tokio::time::sleep(Duration::from_secs(30)).await,
                    }
                });
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let base = serve(Some(concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: text/html\r\n",
            "Content-Length: 5\r\n",
            "Connection: close\r\n\r\n",
            "hello",
        )))
        .await;

        let body = client(5).fetch_page(&format!("{base}/books?page=1")).await.unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let base = serve(Some(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ))
        .await;
        let url = format!("{base}/books?page=1");

        match client(5).fetch_page(&url).await {
            Err(FetchError::Status { url: failed, status }) => {
                assert_eq!(status, 500);
                assert_eq!(failed, url);
            }
            other => panic!("expected a status failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let base = serve(None).await;
        let url = format!("{base}/books?page=1");

        match client(1).fetch_page(&url).await {
            Err(FetchError::Timeout { url: failed }) => assert_eq!(failed, url),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }
}
