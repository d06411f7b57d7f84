//! Bounded batch probing of every quality level of one kind.

use futures::future::join_all;
use tracing::{debug, instrument};

use super::quality::MediaKind;
use super::variant::{VariantProbeOutcome, VariantResolver};
use crate::extract::VideoReference;

/// Probe `levels` in windows of `limit`, preserving input order.
///
/// Each window is awaited in full before the next starts, so at most
/// `limit` extractions are in flight. A `limit` of 0 is treated as 1.
/// Individual failures are `Unavailable` entries; the batch never fails.
#[instrument(
    skip(resolver, reference, levels),
    fields(reference = %reference, levels = levels.len())
)]
pub async fn probe_all(
    resolver: &VariantResolver,
    reference: &VideoReference,
    kind: MediaKind,
    levels: &[u32],
    limit: usize,
) -> Vec<VariantProbeOutcome> {
    let limit = limit.max(1);
    let mut outcomes = Vec::with_capacity(levels.len());

    for (window, chunk) in levels.chunks(limit).enumerate() {
        debug!(window, size = chunk.len(), "probing window");
        let probes = chunk
            .iter()
            .map(|&level| resolver.resolve(reference, kind, level));
        outcomes.extend(join_all(probes).await);
    }

    outcomes
}
