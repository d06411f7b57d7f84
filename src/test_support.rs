//! In-process media host and capability fakes used by unit tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use crate::error::ResolveError;
use crate::extract::{Extraction, Extractor, MetadataSource, SearchHit, Searcher, VideoReference};
use crate::media::{MediaKind, RawMetadata, SizeProber};

pub const MEDIA_BYTES: usize = 4096;

/// Serve a tiny media host on an ephemeral port and return its address.
///
/// Routes: `/video.mp4` (4096 bytes), `/redirect` (→ `/video.mp4`),
/// `/missing` (404), `/slow` (answers after 3 s).
pub async fn spawn_media_server() -> SocketAddr {
    let app = Router::new()
        .route("/video.mp4", get(video))
        .route("/redirect", get(|| async { Redirect::temporary("/video.mp4") }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/slow", get(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn video() -> Response {
    (
        [
            (header::CONTENT_TYPE, "video/mp4"),
            (header::CONTENT_LENGTH, "4096"),
        ],
        vec![7u8; MEDIA_BYTES],
    )
        .into_response()
}

async fn slow() -> Response {
    tokio::time::sleep(Duration::from_secs(3)).await;
    video().await
}

// ============================================================================
// Capability fakes
// ============================================================================

/// How [`FakeExtractor`] answers one `(kind, level)` pair.
#[derive(Clone)]
pub enum Behaviour {
    Resolve {
        delay: Duration,
        extraction: Extraction,
    },
    Fail,
    /// Never answers; only a timeout ends the call.
    Hang,
}

impl Behaviour {
    pub fn resolve(url: &str, title: Option<&str>) -> Self {
        Self::resolve_with(Extraction {
            url: Some(url.to_string()),
            metadata: RawMetadata {
                title: title.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    pub fn resolve_with(extraction: Extraction) -> Self {
        Self::Resolve {
            delay: Duration::ZERO,
            extraction,
        }
    }

    pub fn delayed(self, by: Duration) -> Self {
        match self {
            Self::Resolve { extraction, .. } => Self::Resolve {
                delay: by,
                extraction,
            },
            other => other,
        }
    }
}

/// Scripted [`Extractor`] that records call counts and peak concurrency.
pub struct FakeExtractor {
    script: HashMap<(MediaKind, u32), Behaviour>,
    fallback: Behaviour,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeExtractor {
    /// Every unscripted pair fails.
    pub fn new() -> Self {
        Self {
            script: HashMap::new(),
            fallback: Behaviour::Fail,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, kind: MediaKind, level: u32, behaviour: Behaviour) -> Self {
        self.script.insert((kind, level), behaviour);
        self
    }

    pub fn otherwise(mut self, behaviour: Behaviour) -> Self {
        self.fallback = behaviour;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract(
        &self,
        _reference: &VideoReference,
        kind: MediaKind,
        level: u32,
    ) -> crate::Result<Extraction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        // yield so sibling calls in the same window overlap
        tokio::time::sleep(Duration::from_millis(10)).await;

        match self.script.get(&(kind, level)).unwrap_or(&self.fallback) {
            Behaviour::Resolve { delay, extraction } => {
                tokio::time::sleep(*delay).await;
                Ok(extraction.clone())
            }
            Behaviour::Fail => Err(ResolveError::upstream(format!(
                "no {kind} format at {level}"
            ))),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

/// [`SizeProber`] that always reports the same answer.
pub struct FixedProber(pub Option<u64>);

#[async_trait]
impl SizeProber for FixedProber {
    async fn probe_size(&self, _url: &str) -> Option<u64> {
        self.0
    }
}

/// [`Searcher`] returning a fixed hit, or failing with `failure`, and
/// counting calls.
#[derive(Default)]
pub struct FakeSearcher {
    pub hit: Option<SearchHit>,
    pub failure: Option<&'static str>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl Searcher for FakeSearcher {
    async fn search(&self, _query: &str) -> crate::Result<Option<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(message) => Err(ResolveError::upstream(message)),
            None => Ok(self.hit.clone()),
        }
    }
}

/// [`MetadataSource`] returning a fixed record, or failing when `None`.
pub struct FixedMetadata(pub Option<RawMetadata>);

#[async_trait]
impl MetadataSource for FixedMetadata {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn metadata(&self, _reference: &VideoReference) -> crate::Result<RawMetadata> {
        self.0
            .clone()
            .ok_or_else(|| ResolveError::upstream("metadata unavailable"))
    }
}

/// [`MetadataSource`] that answers after `delay`.
pub struct DelayedMetadata {
    pub delay: Duration,
    pub raw: RawMetadata,
}

#[async_trait]
impl MetadataSource for DelayedMetadata {
    fn name(&self) -> &'static str {
        "delayed"
    }

    async fn metadata(&self, _reference: &VideoReference) -> crate::Result<RawMetadata> {
        tokio::time::sleep(self.delay).await;
        Ok(self.raw.clone())
    }
}
