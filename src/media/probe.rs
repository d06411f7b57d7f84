//! Byte-size discovery via HEAD requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use tracing::debug;

use crate::http_client::HttpClient;

/// Discovers the byte length of a resolved media URL.
///
/// Implementations must never fetch the body and must never fail:
/// every problem maps to `None` ("unknown").
#[async_trait]
pub trait SizeProber: Send + Sync {
    async fn probe_size(&self, url: &str) -> Option<u64>;
}

/// [`SizeProber`] issuing a HEAD request bounded by its own timeout.
#[derive(Clone)]
pub struct HeadProber {
    client: HttpClient,
    timeout: Duration,
}

impl HeadProber {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn content_length(&self, url: &str) -> reqwest::Result<Option<u64>> {
        let response = self.client.head(url).await?;
        if !response.status().is_success() {
            debug!(url, status = %response.status(), "HEAD rejected");
            return Ok(None);
        }
        Ok(response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok()))
    }
}

#[async_trait]
impl SizeProber for HeadProber {
    async fn probe_size(&self, url: &str) -> Option<u64> {
        match tokio::time::timeout(self.timeout, self.content_length(url)).await {
            Ok(Ok(size)) => size,
            Ok(Err(e)) => {
                debug!(url, error = %e, "HEAD failed");
                None
            }
            Err(_) => {
                debug!(url, timeout_ms = self.timeout.as_millis(), "HEAD timed out");
                None
            }
        }
    }
}
