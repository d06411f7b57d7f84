//! HTTP surface: `/resolve`, `/fetch`, `/stream`, `/health`.
//!
//! All handlers share one immutable [`AppState`]. CORS is fully permissive
//! and answers pre-flight requests on every route.

pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderName, Method, Request};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::http_client::HttpClient;
use crate::service::ResolutionService;

pub use error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ResolutionService>,
    pub client: HttpClient,
    pub config: Arc<Config>,
}

impl AppState {
    /// Production wiring from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured proxy is invalid.
    pub fn from_config(config: Config) -> Result<Self> {
        let client = HttpClient::with_proxy(config.ytdlp.proxy.as_deref())?;
        let service = ResolutionService::from_config(&config, client.clone());
        Ok(Self::new(service, client, config))
    }

    pub fn new(service: ResolutionService, client: HttpClient, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            client,
            config: Arc::new(config),
        }
    }
}

/// Build the router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(Duration::from_secs(86_400));

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Router::new()
        .route("/resolve", get(handlers::resolve))
        .route("/fetch", get(handlers::fetch))
        .route("/stream", get(handlers::stream))
        .route("/health", get(handlers::health))
        .layer(trace)
        .layer(cors)
        .with_state(state)
}

/// Bind `config.bind` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.bind;
    let state = AppState::from_config(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
