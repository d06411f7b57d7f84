//! Error types shared by the resolution pipeline and the HTTP layer.
//!
//! Individual variant failures never surface here: the scheduler turns them
//! into [`VariantProbeOutcome::Unavailable`](crate::media::VariantProbeOutcome).
//! Only request-level faults (bad input, no search hit, total upstream
//! outage, proxy transport failure) are represented.

use thiserror::Error;

/// Request-level failures.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Missing or malformed reference, media type or quality level.
    #[error("{0}")]
    InvalidInput(String),

    /// A free-text search produced no candidate video.
    #[error("{0}")]
    NotFound(String),

    /// The extraction or search capability failed for the whole request.
    ///
    /// The message may carry paths and tool output; it is logged, never
    /// sent to HTTP callers.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A request-level failure with a fixed message safe to show callers.
    #[error("{0}")]
    Unavailable(&'static str),

    /// The proxied media URL could not be fetched.
    #[error("stream error: {0}")]
    Stream(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolveError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Whether the caller is at fault (4xx) rather than the service (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
