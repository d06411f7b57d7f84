//! Service configuration loaded from `~/.config/tubeprobe/config.toml`.
//!
//! Every key is optional. Environment variables override the file:
//! `TUBEPROBE_BIND`, `TUBEPROBE_YTDLP`, `TUBEPROBE_CONCURRENCY`.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::error::ResolveError;
use crate::extract::YtDlpConfig;

/// What `/fetch` answers with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// JSON body describing the variant.
    #[default]
    Json,
    /// `302` straight to the media URL.
    Redirect,
}

impl FromStr for FetchMode {
    type Err = ResolveError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "redirect" => Ok(Self::Redirect),
            other => Err(ResolveError::invalid(format!(
                "Invalid mode '{other}'. Use 'json' or 'redirect'"
            ))),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Redirect => write!(f, "redirect"),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen address for `serve`.
    pub bind: SocketAddr,
    /// Maximum extraction calls in flight per request.
    pub concurrency_limit: usize,
    /// Bound on each extraction, search, and metadata call.
    pub resolve_timeout_secs: u64,
    /// Bound on each HEAD size probe.
    pub probe_timeout_secs: u64,
    pub fetch_mode: FetchMode,
    /// Brand prepended to streamed filenames as `"<prefix> - <name>"`.
    pub filename_prefix: Option<String>,
    pub ytdlp: YtDlpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            concurrency_limit: 2,
            resolve_timeout_secs: 30,
            probe_timeout_secs: 5,
            fetch_mode: FetchMode::Json,
            filename_prefix: None,
            ytdlp: YtDlpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration and apply environment overrides.
    ///
    /// With an explicit `path` the file must exist. Without one, the
    /// default location is used and a missing file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, or an
    /// override variable holds an unparseable value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    tracing::debug!("no config at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    /// Apply `TUBEPROBE_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lookup("TUBEPROBE_BIND") {
            self.bind = bind
                .parse()
                .with_context(|| format!("TUBEPROBE_BIND is not an address: {bind}"))?;
        }
        if let Some(binary) = lookup("TUBEPROBE_YTDLP") {
            self.ytdlp.binary = PathBuf::from(binary);
        }
        if let Some(limit) = lookup("TUBEPROBE_CONCURRENCY") {
            self.concurrency_limit = limit
                .parse()
                .with_context(|| format!("TUBEPROBE_CONCURRENCY is not a number: {limit}"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.resolve_timeout_secs == 0 || self.probe_timeout_secs == 0 {
            bail!("timeouts must be at least one second");
        }
        if self.probe_timeout_secs >= self.resolve_timeout_secs {
            bail!(
                "probe_timeout_secs ({}) must be shorter than resolve_timeout_secs ({})",
                self.probe_timeout_secs,
                self.resolve_timeout_secs
            );
        }
        Ok(())
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tubeprobe")
        .join("config.toml")
}
