//! YouTube metadata via the oEmbed API.
//!
//! Uses YouTube's official oEmbed endpoint as a cheap metadata fallback
//! when `yt-dlp` cannot describe a video. Provides title, author, and
//! thumbnail only; duration and view count stay at their defaults.
//!
//! # Example
//!
//! ```rust,no_run
//! use tubeprobe::extract::{MetadataSource, OEmbedSource, VideoReference};
//! use tubeprobe::HttpClient;
//!
//! # async fn example() -> tubeprobe::Result<()> {
//! let source = OEmbedSource::new(HttpClient::new()?);
//! let raw = source
//!     .metadata(&VideoReference::from_id("dQw4w9WgXcQ"))
//!     .await?;
//!
//! println!("{:?}", raw.title);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::Deserialize;

use super::{MetadataSource, VideoReference};
use crate::error::{ResolveError, Result};
use crate::http_client::HttpClient;
use crate::media::RawMetadata;

const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Metadata source backed by the oEmbed endpoint.
pub struct OEmbedSource {
    client: HttpClient,
}

impl OEmbedSource {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn oembed_url(reference: &VideoReference) -> String {
        format!(
            "{OEMBED_ENDPOINT}?url={}&format=json",
            urlencoding::encode(reference.as_str())
        )
    }
}

#[async_trait]
impl MetadataSource for OEmbedSource {
    fn name(&self) -> &'static str {
        "oembed"
    }

    async fn metadata(&self, reference: &VideoReference) -> Result<RawMetadata> {
        let oembed_url = Self::oembed_url(reference);
        tracing::debug!("Fetching from YouTube oEmbed: {}", oembed_url);

        let response = self
            .client
            .fetch_text(&oembed_url)
            .await
            .map_err(|e| ResolveError::upstream(format!("oEmbed request failed: {e}")))?;

        let oembed: YouTubeOEmbed = serde_json::from_str(&response)?;
        Ok(oembed.into_raw(reference))
    }
}

// ============================================================================
// YouTube oEmbed API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct YouTubeOEmbed {
    title: String,
    author_name: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

impl YouTubeOEmbed {
    fn into_raw(self, reference: &VideoReference) -> RawMetadata {
        RawMetadata {
            id: reference.video_id().map(str::to_string),
            title: Some(self.title),
            uploader: Some(self.author_name),
            thumbnail: self.thumbnail_url,
            ..Default::default()
        }
    }
}
