//! Filename cleaning for both filesystem and `Content-Disposition` use.

use scraper::Html;

const FALLBACK_NAME: &str = "download";

/// Build a display filename: `"<clean title> (<label>).<ext>"`.
///
/// The label part is omitted when `quality_label` is empty. Never fails.
pub fn sanitize(raw_title: &str, quality_label: &str, extension: &str) -> String {
    let name = clean_title(raw_title);
    let quality = if quality_label.is_empty() {
        String::new()
    } else {
        format!(" ({quality_label})")
    };
    format!("{name}{quality}.{extension}")
}

/// Normalise a title to lower-case words made of letters, digits, `_` and `-`.
///
/// Applying it to its own output returns the same string.
pub fn clean_title(raw: &str) -> String {
    let decoded = decode_entities(raw).to_lowercase();

    let kept: String = decoded
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect();

    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        collapsed
    }
}

/// Decode HTML entities (`&amp;`, `&#39;`, ...) in a title.
///
/// `<` is escaped first so the parser sees only text: tag-like runs and
/// comment openers stay in the title instead of being dropped as markup.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let fragment = Html::parse_fragment(&raw.replace('<', "&lt;"));
    fragment.root_element().text().collect()
}

/// Scrub a caller-supplied name so it can sit inside a quoted header value.
pub fn header_safe(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '\\' | '/'))
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `Content-Disposition` value forcing a download under `name`.
///
/// Non-ASCII names get an ASCII `filename` fallback plus an RFC 5987
/// `filename*` parameter.
pub fn content_disposition(name: &str) -> String {
    let safe = header_safe(name);
    if safe.is_ascii() {
        return format!("attachment; filename=\"{safe}\"");
    }
    let ascii: String = safe
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
        urlencoding::encode(&safe)
    )
}
