//! Variant discovery for one video.
//!
//! # Pipeline
//!
//! ```text
//! QualityTable ──► probe_all (windows of `limit`)
//!                    └─► VariantResolver::resolve × level
//!                          ├─► Extractor (raced against a timeout)
//!                          ├─► sanitize (display filename)
//!                          └─► SizeProber (HEAD, best effort)
//!                  ──► aggregate(metadata, video, audio)
//! ```
//!
//! Nothing in this module returns an error for a missing variant; absent
//! formats simply do not appear in the [`ResolutionResult`].

pub mod aggregate;
pub mod metadata;
pub mod probe;
pub mod quality;
pub mod sanitize;
pub mod scheduler;
pub mod variant;

pub use aggregate::{aggregate, Downloads, ResolutionResult};
pub use metadata::{MediaMetadata, RawMetadata, Thumbnail};
pub use probe::{HeadProber, SizeProber};
pub use quality::{MediaKind, QualityTable, AUDIO_QUALITIES, VIDEO_QUALITIES};
pub use sanitize::{clean_title, content_disposition, header_safe, sanitize};
pub use scheduler::probe_all;
pub use variant::{ResolvedVariant, VariantProbeOutcome, VariantResolver};
