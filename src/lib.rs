//! `tubeprobe` - YouTube reference to downloadable variant resolution
//!
//! # Features
//!
//! - **Reference resolution**: watch URLs, bare video IDs, or free-text search
//! - **Variant discovery**: every video resolution and audio bitrate, probed
//!   with bounded concurrency and a per-call timeout
//! - **Size probing**: HEAD requests for `Content-Length`, never the body
//! - **HTTP API**: `/resolve`, `/fetch`, `/stream`, `/health` with open CORS
//!
//! # Example
//!
//! ```rust,no_run
//! use tubeprobe::{Config, HttpClient, ResolutionService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let service = ResolutionService::from_config(&config, HttpClient::new()?);
//!     let result = service.resolve("dQw4w9WgXcQ").await?;
//!     println!("{} video variants", result.downloads.video.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod media;
pub mod server;
pub mod service;

#[cfg(test)]
mod test_support;

pub use config::{Config, FetchMode};
pub use error::{ResolveError, Result};
pub use extract::{VideoReference, YtDlpConfig};
pub use http_client::HttpClient;
pub use media::{
    MediaKind, MediaMetadata, QualityTable, ResolutionResult, ResolvedVariant,
    VariantProbeOutcome,
};
pub use service::{ResolutionService, ServiceSettings};

/// Version of tubeprobe
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
