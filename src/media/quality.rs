//! Media kinds and the fixed quality preference tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Video resolutions in descending preference.
pub const VIDEO_QUALITIES: [u32; 5] = [1080, 720, 480, 360, 144];

/// Audio bitrates (kbps) in descending preference.
pub const AUDIO_QUALITIES: [u32; 4] = [320, 256, 128, 92];

/// Audio or video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Extension used when the extractor does not report one.
    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    /// Human label for a level, e.g. `720p` or `128kbps`.
    pub fn quality_label(self, level: u32) -> String {
        match self {
            Self::Video => format!("{level}p"),
            Self::Audio => format!("{level}kbps"),
        }
    }

    /// Level used by single-variant fetches when none is given.
    pub fn default_level(self) -> u32 {
        match self {
            Self::Video => 360,
            Self::Audio => 128,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" | "mp4" => Ok(Self::Video),
            "audio" | "mp3" => Ok(Self::Audio),
            other => Err(ResolveError::invalid(format!(
                "Invalid type '{other}'. Use 'video' or 'audio'"
            ))),
        }
    }
}

/// Immutable preference tables handed to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityTable {
    video: Vec<u32>,
    audio: Vec<u32>,
}

impl QualityTable {
    pub fn new(video: Vec<u32>, audio: Vec<u32>) -> Self {
        Self { video, audio }
    }

    /// Levels for `kind`, most preferred first.
    pub fn levels(&self, kind: MediaKind) -> &[u32] {
        match kind {
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
        }
    }

    pub fn contains(&self, kind: MediaKind, level: u32) -> bool {
        self.levels(kind).contains(&level)
    }
}

impl Default for QualityTable {
    fn default() -> Self {
        Self::new(VIDEO_QUALITIES.to_vec(), AUDIO_QUALITIES.to_vec())
    }
}
