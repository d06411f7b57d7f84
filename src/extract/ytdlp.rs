//! `yt-dlp` subprocess backend.
//!
//! Implements [`Extractor`], [`Searcher`] and [`MetadataSource`] by running
//! `yt-dlp --dump-json` and parsing its single-line JSON output. Child
//! processes are killed when the awaiting future is dropped, so a timed-out
//! resolution does not leave a stray `yt-dlp` behind.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{Extraction, Extractor, MetadataSource, SearchHit, Searcher, VideoReference};
use crate::error::{ResolveError, Result};
use crate::media::{MediaKind, RawMetadata};

/// Settings for locating and invoking `yt-dlp`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct YtDlpConfig {
    /// Path or name of the executable.
    pub binary: PathBuf,
    /// Netscape cookies file passed through `--cookies`.
    pub cookies: Option<PathBuf>,
    /// Proxy URL passed through `--proxy`.
    pub proxy: Option<String>,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            cookies: None,
            proxy: None,
        }
    }
}

/// `yt-dlp` backed capability provider.
pub struct YtDlp {
    config: YtDlpConfig,
}

impl YtDlp {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    /// Format selector for one quality level.
    ///
    /// Video asks for an exact height (muxed first, then video-only) so a
    /// missing resolution is reported as missing instead of silently
    /// downgraded. Audio takes the best stream not above the bitrate.
    fn format_selector(kind: MediaKind, level: u32) -> String {
        match kind {
            MediaKind::Video => format!("b[height={level}]/bv*[height={level}]"),
            MediaKind::Audio => format!("ba[abr<={level}]"),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(["--dump-json", "--no-warnings", "--no-playlist", "--skip-download"]);
        if let Some(cookies) = &self.config.cookies {
            cmd.arg("--cookies").arg(cookies);
        }
        if let Some(proxy) = &self.config.proxy {
            cmd.arg("--proxy").arg(proxy);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run `cmd` and return its stdout, mapping failures to upstream errors.
    async fn run(&self, mut cmd: Command) -> Result<String> {
        let output = cmd.output().await.map_err(|e| {
            ResolveError::upstream(format!(
                "failed to run {}: {e}",
                self.config.binary.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = last_error_line(&stderr).unwrap_or("no error output");
            return Err(ResolveError::upstream(format!(
                "yt-dlp exited with {}: {reason}",
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Extractor for YtDlp {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    #[instrument(skip(self, reference), fields(reference = %reference))]
    async fn extract(
        &self,
        reference: &VideoReference,
        kind: MediaKind,
        level: u32,
    ) -> Result<Extraction> {
        let mut cmd = self.command();
        cmd.arg("-f")
            .arg(Self::format_selector(kind, level))
            .args(["-o", "%(title)s.%(ext)s"])
            .arg(reference.as_str());

        let stdout = self.run(cmd).await?;
        let line = first_json_line(&stdout)
            .ok_or_else(|| ResolveError::upstream("yt-dlp printed no JSON"))?;
        let dump: FormatDump = serde_json::from_str(line)?;
        debug!(has_url = dump.url.is_some(), ext = ?dump.ext, "yt-dlp format resolved");

        Ok(Extraction {
            url: dump.url,
            filename: dump.filename,
            extension: dump.ext,
            metadata: dump.metadata,
        })
    }
}

#[async_trait]
impl Searcher for YtDlp {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Option<SearchHit>> {
        let mut cmd = self.command();
        cmd.arg("--flat-playlist").arg(format!("ytsearch1:{query}"));

        let stdout = self.run(cmd).await?;
        let Some(line) = first_json_line(&stdout) else {
            return Ok(None);
        };
        let entry: SearchEntry = serde_json::from_str(line)?;
        Ok(entry.into_hit())
    }
}

#[async_trait]
impl MetadataSource for YtDlp {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn metadata(&self, reference: &VideoReference) -> Result<RawMetadata> {
        let mut cmd = self.command();
        cmd.arg(reference.as_str());

        let stdout = self.run(cmd).await?;
        let line = first_json_line(&stdout)
            .ok_or_else(|| ResolveError::upstream("yt-dlp printed no JSON"))?;
        Ok(serde_json::from_str(line)?)
    }
}

fn first_json_line(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with('{'))
}

/// yt-dlp prefixes failures with `ERROR:`; fall back to the last line.
fn last_error_line(stderr: &str) -> Option<&str> {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or(lines.last())
        .copied()
}

// ============================================================================
// yt-dlp JSON shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct FormatDump {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(flatten)]
    metadata: RawMetadata,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl SearchEntry {
    fn into_hit(self) -> Option<SearchHit> {
        let url = self
            .url
            .filter(|u| u.starts_with("http"))
            .or_else(|| {
                self.id
                    .as_ref()
                    .map(|id| VideoReference::from_id(id).as_str().to_string())
            })?;
        Some(SearchHit {
            title: self.title.unwrap_or_default(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_pin_the_requested_level() {
        assert_eq!(
            YtDlp::format_selector(MediaKind::Video, 720),
            "b[height=720]/bv*[height=720]"
        );
        assert_eq!(YtDlp::format_selector(MediaKind::Audio, 128), "ba[abr<=128]");
    }

    #[test]
    fn command_passes_cookies_and_proxy() {
        let ytdlp = YtDlp::new(YtDlpConfig {
            binary: PathBuf::from("/opt/yt-dlp"),
            cookies: Some(PathBuf::from("/tmp/cookies.txt")),
            proxy: Some("socks5://127.0.0.1:1080".into()),
        });
        let cmd = ytdlp.command();
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "/opt/yt-dlp");
        let args: Vec<_> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.contains(&"--dump-json".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "--cookies" && w[1] == "/tmp/cookies.txt"));
        assert!(args.windows(2).any(|w| w[0] == "--proxy" && w[1] == "socks5://127.0.0.1:1080"));
    }

    #[test]
    fn parses_format_dump() {
        let json = r#"{"id":"dQw4w9WgXcQ","title":"Song &amp; Dance","ext":"m4a","url":"https://rr1.googlevideo.com/x","filename":"Song & Dance.m4a","uploader":"Someone"}"#;
        let dump: FormatDump = serde_json::from_str(json).unwrap();
        assert_eq!(dump.url.as_deref(), Some("https://rr1.googlevideo.com/x"));
        assert_eq!(dump.ext.as_deref(), Some("m4a"));
        assert_eq!(dump.metadata.uploader.as_deref(), Some("Someone"));
        assert_eq!(dump.metadata.id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn search_entry_prefers_full_url_then_id() {
        let entry: SearchEntry = serde_json::from_str(
            r#"{"id":"abcdefghijk","title":"Hit","url":"https://www.youtube.com/watch?v=abcdefghijk"}"#,
        )
        .unwrap();
        assert_eq!(
            entry.into_hit().unwrap().url,
            "https://www.youtube.com/watch?v=abcdefghijk"
        );

        let entry: SearchEntry =
            serde_json::from_str(r#"{"id":"abcdefghijk","url":"abcdefghijk"}"#).unwrap();
        assert_eq!(
            entry.into_hit().unwrap().url,
            "https://www.youtube.com/watch?v=abcdefghijk"
        );

        let entry: SearchEntry = serde_json::from_str(r#"{"title":"orphan"}"#).unwrap();
        assert!(entry.into_hit().is_none());
    }

    #[test]
    fn finds_json_among_noise() {
        let out = "[youtube] Extracting URL\n{\"id\":\"x\"}\n";
        assert_eq!(first_json_line(out), Some("{\"id\":\"x\"}"));
        assert_eq!(first_json_line("nothing here"), None);
    }

    #[test]
    fn picks_error_line_from_stderr() {
        let stderr = "WARNING: slow\nERROR: [youtube] x: Requested format is not available\nhint\n";
        assert_eq!(
            last_error_line(stderr),
            Some("ERROR: [youtube] x: Requested format is not available")
        );
        assert_eq!(last_error_line("just one line"), Some("just one line"));
        assert_eq!(last_error_line(""), None);
    }

    #[tokio::test]
    async fn missing_binary_is_upstream_error() {
        let ytdlp = YtDlp::new(YtDlpConfig {
            binary: PathBuf::from("/nonexistent/yt-dlp-binary"),
            ..Default::default()
        });
        let err = ytdlp
            .extract(&VideoReference::from_id("dQw4w9WgXcQ"), MediaKind::Video, 720)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Upstream(_)));
    }
}
