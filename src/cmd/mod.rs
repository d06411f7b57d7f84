pub mod fetch;
pub mod resolve;
pub mod serve;

use anyhow::{Context, Result};

use tubeprobe::{Config, HttpClient, ResolutionService};

/// Production service for one-shot CLI commands.
pub fn service(config: &Config) -> Result<ResolutionService> {
    let client = HttpClient::with_proxy(config.ytdlp.proxy.as_deref())
        .context("failed to build HTTP client")?;
    Ok(ResolutionService::from_config(config, client))
}

/// Human-readable byte count.
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        None => "unknown size".to_string(),
        Some(b) if b < 1024 => format!("{b} B"),
        Some(b) if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        Some(b) if b < 1024 * 1024 * 1024 => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
        Some(b) => format!("{:.2} GB", b as f64 / (1024.0 * 1024.0 * 1024.0)),
    }
}
