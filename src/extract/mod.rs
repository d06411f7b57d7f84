//! Upstream capabilities: extraction, search, and metadata.
//!
//! The resolution pipeline only talks to these traits. The shipped
//! implementations drive the `yt-dlp` executable ([`YtDlp`]) and the
//! YouTube oEmbed endpoint ([`OEmbedSource`]); tests plug in fakes with
//! configurable latency and failure.
//!
//! # Architecture
//!
//! - [`Extractor`]: (reference, kind, level) → direct media URL
//! - [`Searcher`]: free text → first matching video
//! - [`MetadataSource`]: reference → sparse [`RawMetadata`]
//! - [`MetadataChain`]: tries sources in order, first success wins

pub mod oembed;
pub mod reference;
pub mod ytdlp;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::media::{MediaKind, RawMetadata};

pub use oembed::OEmbedSource;
pub use reference::{parse_reference, resolve_reference, ParsedReference, VideoReference};
pub use ytdlp::{YtDlp, YtDlpConfig};

/// Result of one extraction call.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Direct media URL. `None` or blank means the variant does not exist.
    pub url: Option<String>,
    /// Filename suggested by the extractor, possibly with an extension.
    pub filename: Option<String>,
    /// Container extension reported by the extractor (`mp4`, `m4a`, ...).
    pub extension: Option<String>,
    /// Provenance metadata carried alongside the URL.
    pub metadata: RawMetadata,
}

impl Extraction {
    /// The URL if present and non-blank.
    pub fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// A video found by free-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Converts a reference and a quality request into a direct media URL.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short lowercase name for logging.
    fn name(&self) -> &'static str;

    /// Resolve one `(kind, level)` variant of `reference`.
    async fn extract(
        &self,
        reference: &VideoReference,
        kind: MediaKind,
        level: u32,
    ) -> Result<Extraction>;
}

/// Maps free text to the best matching video.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// `Ok(None)` when the search ran but found nothing.
    async fn search(&self, query: &str) -> Result<Option<SearchHit>>;
}

/// Fetches descriptive metadata for a reference.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn metadata(&self, reference: &VideoReference) -> Result<RawMetadata>;
}

/// Ordered list of metadata sources.
///
/// Sources are tried in registration order. First success wins; failures
/// are logged and the next source is tried. `None` when all fail.
#[derive(Clone, Default)]
pub struct MetadataChain {
    sources: Vec<Arc<dyn MetadataSource>>,
}

impl MetadataChain {
    pub fn new(sources: Vec<Arc<dyn MetadataSource>>) -> Self {
        Self { sources }
    }

    pub async fn fetch(&self, reference: &VideoReference) -> Option<RawMetadata> {
        for source in &self.sources {
            match source.metadata(reference).await {
                Ok(raw) => {
                    tracing::debug!(source = source.name(), "metadata resolved");
                    return Some(raw);
                }
                Err(e) => {
                    tracing::warn!(
                        "Metadata source {} failed for {}: {}",
                        source.name(),
                        reference,
                        e
                    );
                }
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl MetadataSource for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn metadata(&self, _reference: &VideoReference) -> Result<RawMetadata> {
            match self.0 {
                Some(title) => Ok(RawMetadata {
                    title: Some(title.to_string()),
                    ..Default::default()
                }),
                None => Err(ResolveError::upstream("down")),
            }
        }
    }

    #[test]
    fn usable_url_rejects_blank() {
        let mut extraction = Extraction::default();
        assert!(extraction.usable_url().is_none());
        extraction.url = Some("   ".into());
        assert!(extraction.usable_url().is_none());
        extraction.url = Some(" https://cdn.example/v.mp4 ".into());
        assert_eq!(extraction.usable_url(), Some("https://cdn.example/v.mp4"));
    }

    #[tokio::test]
    async fn chain_falls_through_to_next_source() {
        let chain = MetadataChain::new(vec![
            Arc::new(Fixed(None)),
            Arc::new(Fixed(Some("second"))),
            Arc::new(Fixed(Some("third"))),
        ]);
        let raw = chain
            .fetch(&VideoReference::from_id("dQw4w9WgXcQ"))
            .await
            .unwrap();
        assert_eq!(raw.title.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn chain_reports_total_failure_as_none() {
        let chain = MetadataChain::new(vec![Arc::new(Fixed(None))]);
        assert!(chain
            .fetch(&VideoReference::from_id("dQw4w9WgXcQ"))
            .await
            .is_none());
        assert!(MetadataChain::default()
            .fetch(&VideoReference::from_id("dQw4w9WgXcQ"))
            .await
            .is_none());
    }
}
