//! Route handlers.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::error::ApiError;
use super::AppState;
use crate::config::FetchMode;
use crate::error::ResolveError;
use crate::media::{content_disposition, MediaKind, ResolutionResult};

const DEFAULT_STREAM_NAME: &str = "video.mp4";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// GET /resolve
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    ok: bool,
    #[serde(flatten)]
    result: ResolutionResult,
}

pub async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let input = query.q.unwrap_or_default();
    let result = state.service.resolve(&input).await?;
    Ok(Json(ResolveResponse { ok: true, result }))
}

// ============================================================================
// GET /fetch
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    q: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    quality: Option<String>,
    mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    ok: bool,
    url: String,
    filename: String,
    size: Option<u64>,
    #[serde(rename = "type")]
    kind: &'static str,
    quality: u32,
}

pub async fn fetch(
    State(state): State<AppState>,
    Query(query): Query<FetchQuery>,
) -> Result<Response, ApiError> {
    let kind = non_blank(query.kind.as_deref())
        .map(str::parse::<MediaKind>)
        .transpose()?
        .unwrap_or(MediaKind::Video);
    let level = non_blank(query.quality.as_deref())
        .map(|q| {
            q.parse::<u32>()
                .map_err(|_| ApiError::bad_request(format!("Invalid quality '{q}'")))
        })
        .transpose()?;
    let mode = non_blank(query.mode.as_deref())
        .map(str::parse::<FetchMode>)
        .transpose()?
        .unwrap_or(state.config.fetch_mode);

    let input = query.q.unwrap_or_default();
    let variant = state.service.fetch_variant(&input, kind, level).await?;
    info!(kind = %kind, quality = variant.quality_number, mode = %mode, "variant fetched");

    match mode {
        FetchMode::Json => Ok(Json(FetchResponse {
            ok: true,
            url: variant.url,
            filename: variant.filename,
            size: variant.size,
            kind: kind.default_extension(),
            quality: variant.quality_number,
        })
        .into_response()),
        FetchMode::Redirect => {
            let location = HeaderValue::from_str(&variant.url)
                .map_err(|_| ResolveError::Unavailable("Extractor returned an invalid URL"))?;
            let disposition = HeaderValue::from_str(&content_disposition(&variant.filename))
                .map_err(|_| ResolveError::Unavailable("Could not build download headers"))?;
            let mut headers = HeaderMap::new();
            headers.insert(LOCATION, location);
            headers.insert(CONTENT_DISPOSITION, disposition);
            Ok((StatusCode::FOUND, headers).into_response())
        }
    }
}

// ============================================================================
// GET /stream
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    url: Option<String>,
    filename: Option<String>,
}

/// Proxy a resolved media URL as an attachment.
///
/// Upstream status is checked before any byte is sent, so failures are
/// still proper `502` JSON responses. The body is streamed, never buffered.
pub async fn stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Response, ApiError> {
    let raw_url = non_blank(query.url.as_deref())
        .ok_or_else(|| ApiError::bad_request("Missing download URL"))?;
    let url = Url::parse(raw_url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| ApiError::bad_request("Download URL must be http or https"))?;

    let name = non_blank(query.filename.as_deref()).unwrap_or(DEFAULT_STREAM_NAME);
    let name = match non_blank(state.config.filename_prefix.as_deref()) {
        Some(prefix) => format!("{prefix} - {name}"),
        None => name.to_string(),
    };
    let disposition = HeaderValue::from_str(&content_disposition(&name))
        .map_err(|_| ApiError::bad_request("Invalid filename"))?;

    let upstream = state
        .client
        .get(url.as_str())
        .await
        .map_err(|e| ResolveError::Stream(format!("GET {url} failed: {e}")))?;
    if !upstream.status().is_success() {
        return Err(ResolveError::Stream(format!("GET {url} answered {}", upstream.status())).into());
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        upstream
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream")),
    );
    if let Some(length) = upstream.headers().get(CONTENT_LENGTH) {
        headers.insert(CONTENT_LENGTH, length.clone());
    }
    headers.insert(CONTENT_DISPOSITION, disposition);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    debug!(url = %url, name = %name, "streaming");

    Ok((headers, Body::from_stream(upstream.bytes_stream())).into_response())
}

// ============================================================================
// GET /health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    ok: bool,
    message: &'static str,
    timestamp: String,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: "tubeprobe is running",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: crate::VERSION,
    })
}
