//! Shared outbound HTTP client
//!
//! One pooled client serves every outbound request the service makes:
//! - HEAD probes against media hosts (size discovery)
//! - oEmbed metadata lookups
//! - GET requests proxied through `/stream`

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Response};
use tracing::{debug, instrument};

use crate::error::{ResolveError, Result};

const USER_AGENT: &str = concat!("tubeprobe/", env!("CARGO_PKG_VERSION"));

/// Pooled HTTP client with sane timeouts for media hosts.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client that connects directly, ignoring proxy env vars.
    pub fn new() -> Result<Self> {
        Self::with_proxy(None)
    }

    /// Create the client, routing everything through `proxy` when given.
    ///
    /// No overall request timeout is set: `/stream` bodies can take minutes.
    /// Callers bound short operations with `tokio::time::timeout`.
    pub fn with_proxy(proxy: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let mut builder = Client::builder();
        builder = match proxy {
            Some(proxy) => builder.proxy(
                reqwest::Proxy::all(proxy)
                    .map_err(|e| ResolveError::Config(format!("invalid proxy '{proxy}': {e}")))?,
            ),
            None => builder.no_proxy(),
        };

        let client = builder
            .user_agent(USER_AGENT)
            .default_headers(headers)
            // Keep connections alive for reuse across probes
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .gzip(true)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ResolveError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Header-only request; redirects are followed.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn head(&self, url: &str) -> reqwest::Result<Response> {
        debug!("HEAD");
        self.client.head(url).send().await
    }

    /// GET request whose body is left unread for the caller to stream.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn get(&self, url: &str) -> reqwest::Result<Response> {
        debug!("GET");
        self.client.get(url).send().await
    }

    /// Fetch and return body as string, failing on non-success status.
    pub async fn fetch_text(&self, url: &str) -> reqwest::Result<String> {
        let response = self.get(url).await?.error_for_status()?;
        response.text().await
    }
}
