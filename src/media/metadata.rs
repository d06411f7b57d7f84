//! Descriptive metadata for a video and its normalisation.
//!
//! Upstream records are sparse and use several names for the same thing.
//! [`MediaMetadata::from_raw`] applies one fixed precedence per field:
//!
//! | field     | precedence                                                   |
//! |-----------|--------------------------------------------------------------|
//! | title     | `title`, `fulltitle`, `"Unknown Title"`                      |
//! | author    | `uploader`, `channel`, `"Unknown Author"`                    |
//! | duration  | `duration_string`, formatted `duration`, `"Unknown duration"`|
//! | thumbnail | `thumbnail`, last of `thumbnails`, derived from id, null     |
//!
//! Blank strings count as missing.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const UNKNOWN_DURATION: &str = "Unknown duration";

/// Raw metadata as reported by a metadata source (yt-dlp field names).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fulltitle: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub duration_string: Option<String>,
    /// Length in seconds. yt-dlp reports this as a float for some sites.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnails: Option<Vec<Thumbnail>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,
}

impl RawMetadata {
    /// Best available title, if any.
    pub fn display_title(&self) -> Option<&str> {
        non_blank(self.title.as_deref()).or_else(|| non_blank(self.fulltitle.as_deref()))
    }
}

/// Normalised metadata returned to clients. Never absent, only sparse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
    pub duration: String,
    pub views: u64,
    pub thumbnail: Option<String>,
    pub video_id: Option<String>,
}

impl MediaMetadata {
    /// Record used when every metadata source failed.
    pub fn fallback(video_id: Option<&str>) -> Self {
        Self::from_raw(&RawMetadata::default(), video_id)
    }

    /// Normalise `raw`; `video_id` fills in when the source did not report one.
    pub fn from_raw(raw: &RawMetadata, video_id: Option<&str>) -> Self {
        let video_id = non_blank(raw.id.as_deref())
            .or_else(|| non_blank(video_id))
            .map(str::to_string);

        let title = raw.display_title().unwrap_or(UNKNOWN_TITLE).to_string();

        let author = non_blank(raw.uploader.as_deref())
            .or_else(|| non_blank(raw.channel.as_deref()))
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_string();

        let duration = non_blank(raw.duration_string.as_deref())
            .map(str::to_string)
            .or_else(|| raw.duration.and_then(format_duration))
            .unwrap_or_else(|| UNKNOWN_DURATION.to_string());

        // yt-dlp orders `thumbnails` by preference, best last
        let thumbnail = non_blank(raw.thumbnail.as_deref())
            .map(str::to_string)
            .or_else(|| {
                raw.thumbnails
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .rev()
                    .find(|t| !t.url.trim().is_empty())
                    .map(|t| t.url.clone())
            })
            .or_else(|| {
                video_id
                    .as_deref()
                    .map(|id| format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"))
            });

        Self {
            title,
            author,
            description: raw.description.clone().unwrap_or_default(),
            duration,
            views: raw.view_count.unwrap_or(0),
            thumbnail,
            video_id,
        }
    }
}

/// `m:ss` below an hour, `h:mm:ss` from an hour up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_duration(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let total = seconds.round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    Some(if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_record_is_fully_populated() {
        let meta = MediaMetadata::fallback(None);
        assert_eq!(meta.title, UNKNOWN_TITLE);
        assert_eq!(meta.author, UNKNOWN_AUTHOR);
        assert_eq!(meta.duration, UNKNOWN_DURATION);
        assert_eq!(meta.views, 0);
        assert_eq!(meta.description, "");
        assert!(meta.thumbnail.is_none());
    }

    #[test]
    fn fallback_derives_thumbnail_from_id() {
        let meta = MediaMetadata::fallback(Some("dQw4w9WgXcQ"));
        assert_eq!(
            meta.thumbnail.as_deref(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
        assert_eq!(meta.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn title_wins_over_fulltitle() {
        let raw = RawMetadata {
            title: Some("Short".into()),
            fulltitle: Some("Full".into()),
            ..Default::default()
        };
        assert_eq!(MediaMetadata::from_raw(&raw, None).title, "Short");

        let raw = RawMetadata {
            title: Some("   ".into()),
            fulltitle: Some("Full".into()),
            ..Default::default()
        };
        assert_eq!(MediaMetadata::from_raw(&raw, None).title, "Full");
    }

    #[test]
    fn uploader_wins_over_channel() {
        let raw = RawMetadata {
            uploader: None,
            channel: Some("Chan".into()),
            ..Default::default()
        };
        assert_eq!(MediaMetadata::from_raw(&raw, None).author, "Chan");
    }

    #[test]
    fn duration_prefers_display_string_then_seconds() {
        let raw = RawMetadata {
            duration_string: Some("3:33".into()),
            duration: Some(9999.0),
            ..Default::default()
        };
        assert_eq!(MediaMetadata::from_raw(&raw, None).duration, "3:33");

        let raw = RawMetadata {
            duration: Some(213.0),
            ..Default::default()
        };
        assert_eq!(MediaMetadata::from_raw(&raw, None).duration, "3:33");

        let raw = RawMetadata {
            duration: Some(3723.0),
            ..Default::default()
        };
        assert_eq!(MediaMetadata::from_raw(&raw, None).duration, "1:02:03");
    }

    #[test]
    fn thumbnail_uses_last_listed_before_derivation() {
        let raw = RawMetadata {
            id: Some("abcdefghijk".into()),
            thumbnails: Some(vec![
                Thumbnail { url: "https://t/low.jpg".into() },
                Thumbnail { url: "https://t/high.jpg".into() },
            ]),
            ..Default::default()
        };
        assert_eq!(
            MediaMetadata::from_raw(&raw, None).thumbnail.as_deref(),
            Some("https://t/high.jpg")
        );
    }

    #[test]
    fn deserializes_ytdlp_json() {
        let json = r#"{
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "uploader": "Rick Astley",
            "view_count": 1500000000,
            "duration": 212.0,
            "duration_string": "3:32",
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
            "formats": [{"format_id": "18"}]
        }"#;
        let raw: RawMetadata = serde_json::from_str(json).unwrap();
        let meta = MediaMetadata::from_raw(&raw, None);
        assert_eq!(meta.title, "Never Gonna Give You Up");
        assert_eq!(meta.author, "Rick Astley");
        assert_eq!(meta.views, 1_500_000_000);
        assert_eq!(meta.duration, "3:32");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(MediaMetadata::fallback(Some("x"))).unwrap();
        assert_eq!(json["videoId"], "x");
        assert_eq!(json["title"], UNKNOWN_TITLE);
    }
}
