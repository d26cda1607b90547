//! HTTP boundary of the extraction pipeline.
//!
//! | Route | |
//! |---|---|
//! | `POST /api/extract` | [`ExtractionRequest`](btx_common::ExtractionRequest) in, [`ExtractionResult`](btx_common::ExtractionResult) out |
//! | `GET /api/fetch-binary?imageUrl=` | proxies an image or video with the site's referer |
//! | `GET /api/status` | cached [`StatusReport`](btx_common::StatusReport) |
//! | `GET /api/sites` | ranked site catalog |
use std::{net::SocketAddr, sync::Arc};

use axum::{
    http::{header::CACHE_CONTROL, HeaderValue},
    routing::{get, post},
    Router,
};
use btx_core::{
    error::CoreError,
    health::{load_long_tail, targets_from, HealthMonitor, ProbeTarget},
    AppConfig, StatusCache,
};
use btx_extractors::{registry::SiteRegistry, TagExtractor};
use log::{info, warn};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

pub mod error;
pub mod routes;

const STATUS_CACHE_CONTROL: &str = "public, max-age=60, s-maxage=60";

/// Everything the handlers share. Built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub extractor: TagExtractor,
    pub monitor: HealthMonitor,
    pub targets: Vec<ProbeTarget>,
    pub status_cache: StatusCache,
    refresh: Mutex<()>,
}

impl AppState {
    pub fn new(
        extractor: TagExtractor,
        monitor: HealthMonitor,
        targets: Vec<ProbeTarget>,
        status_cache: StatusCache,
    ) -> Self {
        Self {
            extractor,
            monitor,
            targets,
            status_cache,
            refresh: Mutex::new(()),
        }
    }

    /// Wires the state from the config file.
    ///
    /// `self_check_endpoint` is where the pipeline check posts when the config does not name
    /// an endpoint itself; usually this server's own `/api/extract`.
    pub async fn from_config(
        config: &AppConfig,
        registry: Arc<SiteRegistry>,
        self_check_endpoint: &str,
    ) -> Result<Self, CoreError> {
        let long_tail = match &config.health.long_tail {
            Some(path) => load_long_tail(path).await?,
            None => Vec::new(),
        };
        let targets = targets_from(&registry, &long_tail);
        let monitor = HealthMonitor::from_config(config, Some(self_check_endpoint))?;

        Ok(Self::new(
            config.extractor(registry)?,
            monitor,
            targets,
            StatusCache::new(config.cache_ttl()),
        ))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/extract", post(routes::extract))
        .route("/api/fetch-binary", get(routes::fetch_binary))
        .route(
            "/api/status",
            get(routes::status).layer(SetResponseHeaderLayer::overriding(
                CACHE_CONTROL,
                HeaderValue::from_static(STATUS_CACHE_CONTROL),
            )),
        )
        .route("/api/sites", get(routes::sites))
        .layer(cors)
        .with_state(state)
}

/// Serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
