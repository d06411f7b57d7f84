//! Combining metadata and probe outcomes into one response.

use serde::Serialize;

use super::metadata::MediaMetadata;
use super::variant::{ResolvedVariant, VariantProbeOutcome};

/// Downloadable variants per kind, each in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Downloads {
    pub video: Vec<ResolvedVariant>,
    pub audio: Vec<ResolvedVariant>,
}

/// Full result of resolving one reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub metadata: MediaMetadata,
    pub downloads: Downloads,
}

impl ResolutionResult {
    /// True when no variant of either kind was found.
    pub fn is_empty(&self) -> bool {
        self.downloads.video.is_empty() && self.downloads.audio.is_empty()
    }
}

/// Drop unavailable outcomes, keep order. Always succeeds.
pub fn aggregate(
    metadata: MediaMetadata,
    video: Vec<VariantProbeOutcome>,
    audio: Vec<VariantProbeOutcome>,
) -> ResolutionResult {
    ResolutionResult {
        metadata,
        downloads: Downloads {
            video: resolved(video),
            audio: resolved(audio),
        },
    }
}

fn resolved(outcomes: Vec<VariantProbeOutcome>) -> Vec<ResolvedVariant> {
    outcomes
        .into_iter()
        .filter_map(VariantProbeOutcome::into_resolved)
        .collect()
}
