//! Video reference classification and resolution.
//!
//! Input arrives as a watch URL, a bare 11-character video ID, or free
//! text. URLs and IDs resolve locally; free text goes through a
//! [`Searcher`]. Blank input is rejected before anything upstream runs.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use super::Searcher;
use crate::error::{ResolveError, Result};

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)?(www\.|m\.|music\.)?(youtube\.com|youtu\.be)/.+").unwrap()
});

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

static ID_IN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[?&]v=|youtu\.be/|/shorts/|/embed/|/live/)([A-Za-z0-9_-]{11})").unwrap()
});

/// A resolved reference to exactly one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    url: String,
    id: Option<String>,
}

impl VideoReference {
    /// Wrap a watch URL, extracting the video ID when recognisable.
    pub fn from_url(url: &str) -> Self {
        let url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{url}")
        };
        let id = ID_IN_URL
            .captures(&url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        Self { url, id }
    }

    /// Canonical watch URL for a bare video ID.
    pub fn from_id(id: &str) -> Self {
        Self {
            url: format!("https://www.youtube.com/watch?v={id}"),
            id: Some(id.to_string()),
        }
    }

    /// URL handed to the extraction capability.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn video_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl std::fmt::Display for VideoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// What a raw input turned out to be before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReference {
    Direct(VideoReference),
    Search(String),
}

/// Classify raw input. Blank input is an [`ResolveError::InvalidInput`].
pub fn parse_reference(input: &str) -> Result<ParsedReference> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::invalid("Missing video URL or ID"));
    }
    if YOUTUBE_URL.is_match(trimmed) {
        return Ok(ParsedReference::Direct(VideoReference::from_url(trimmed)));
    }
    if VIDEO_ID.is_match(trimmed) {
        return Ok(ParsedReference::Direct(VideoReference::from_id(trimmed)));
    }
    Ok(ParsedReference::Search(trimmed.to_string()))
}

/// Resolve raw input to a single video, searching when needed.
pub async fn resolve_reference(input: &str, searcher: &dyn Searcher) -> Result<VideoReference> {
    match parse_reference(input)? {
        ParsedReference::Direct(reference) => {
            debug!(reference = %reference, "direct reference");
            Ok(reference)
        }
        ParsedReference::Search(query) => {
            let hit = searcher
                .search(&query)
                .await?
                .ok_or_else(|| ResolveError::NotFound("No results found".to_string()))?;
            info!(query = %query, title = %hit.title, url = %hit.url, "search resolved");
            Ok(VideoReference::from_url(&hit.url))
        }
    }
}
