//! Single-variant resolution: extraction, timeout, filename, size.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, instrument};

use super::probe::SizeProber;
use super::quality::MediaKind;
use super::sanitize::sanitize;
use crate::extract::{Extraction, Extractor, VideoReference};

/// Extensions stripped from extractor-suggested filenames before cleaning.
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "m4a", "webm", "mp3", "mkv", "opus", "ogg", "3gp", "mov", "flv", "aac", "wav",
];

/// One downloadable variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVariant {
    /// Display label, e.g. `720p` or `128kbps`.
    pub quality: String,
    pub quality_number: u32,
    pub url: String,
    pub filename: String,
    /// Byte length from the HEAD probe; `null` when unknown.
    pub size: Option<u64>,
}

/// Outcome of probing one `(kind, level)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantProbeOutcome {
    Resolved(ResolvedVariant),
    /// Extraction failed, timed out, or produced no usable URL.
    Unavailable,
}

impl VariantProbeOutcome {
    pub fn into_resolved(self) -> Option<ResolvedVariant> {
        match self {
            Self::Resolved(variant) => Some(variant),
            Self::Unavailable => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Resolves single variants through an [`Extractor`] and a [`SizeProber`].
#[derive(Clone)]
pub struct VariantResolver {
    extractor: Arc<dyn Extractor>,
    prober: Arc<dyn SizeProber>,
    timeout: Duration,
}

impl VariantResolver {
    /// `timeout` bounds the extraction call; the prober carries its own.
    pub fn new(
        extractor: Arc<dyn Extractor>,
        prober: Arc<dyn SizeProber>,
        timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            prober,
            timeout,
        }
    }

    /// Resolve one variant. Never fails: every problem is `Unavailable`.
    ///
    /// On timeout the extraction future is dropped, not awaited further.
    #[instrument(
        skip(self, reference),
        fields(reference = %reference, extractor = self.extractor.name())
    )]
    pub async fn resolve(
        &self,
        reference: &VideoReference,
        kind: MediaKind,
        level: u32,
    ) -> VariantProbeOutcome {
        let extraction = match tokio::time::timeout(
            self.timeout,
            self.extractor.extract(reference, kind, level),
        )
        .await
        {
            Ok(Ok(extraction)) => extraction,
            Ok(Err(e)) => {
                debug!(error = %e, "extraction failed");
                return VariantProbeOutcome::Unavailable;
            }
            Err(_) => {
                debug!(timeout_ms = self.timeout.as_millis(), "extraction timed out");
                return VariantProbeOutcome::Unavailable;
            }
        };

        let Some(url) = extraction.usable_url() else {
            debug!("extraction returned no usable URL");
            return VariantProbeOutcome::Unavailable;
        };

        let filename = display_filename(&extraction, kind, level);
        let size = self.prober.probe_size(url).await;
        debug!(filename = %filename, size = ?size, "variant resolved");

        VariantProbeOutcome::Resolved(ResolvedVariant {
            quality: kind.quality_label(level),
            quality_number: level,
            url: url.to_string(),
            filename,
            size,
        })
    }
}

/// Suggested filename, then metadata title, then the generic fallback.
fn display_filename(extraction: &Extraction, kind: MediaKind, level: u32) -> String {
    let raw = extraction
        .filename
        .as_deref()
        .map(strip_media_extension)
        .filter(|name| !name.trim().is_empty())
        .or_else(|| extraction.metadata.display_title())
        .unwrap_or("download");

    let extension = extraction
        .extension
        .as_deref()
        .map(str::trim)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| kind.default_extension().to_string(), str::to_ascii_lowercase);

    sanitize(raw, &kind.quality_label(level), &extension)
}

fn strip_media_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if MEDIA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => stem,
        _ => name,
    }
}
