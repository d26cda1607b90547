use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue,
    },
    response::{IntoResponse, Response},
    Json,
};
use btx_common::{ExtractionRequest, ExtractionResult, StatusReport};
use btx_extractors::error::ExtractorError;
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{error::ApiError, AppState};

/// Cache policy for proxied media when the origin sends none.
const DEFAULT_BINARY_CACHE: &str = "public, max-age=86400";
const DEFAULT_BINARY_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub struct BinaryQuery {
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
}

/// Catalog entry as listed by `GET /api/sites`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteSummary {
    pub name: String,
    pub domain: String,
    pub rank: u32,
}

pub async fn extract(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExtractionRequest>, JsonRejection>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(&rejection.body_text()))?;

    let result = state.extractor.extract(&request).await?;
    debug!(
        "Extracted {} tags from {}",
        result.tag_count(),
        request.target_url
    );

    Ok(Json(result))
}

pub async fn fetch_binary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BinaryQuery>,
) -> Result<Response, ApiError> {
    let url = query
        .image_url
        .as_deref()
        .and_then(|raw| Url::parse(raw.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .ok_or_else(|| ApiError::bad_request("Missing or invalid imageUrl parameter"))?;

    let fetched = state
        .extractor
        .source()
        .fetch_binary(&url)
        .await
        .map_err(ExtractorError::from)?;

    let header = |value: Option<&str>, fallback: &'static str| {
        value
            .and_then(|v| HeaderValue::from_str(v).ok())
            .unwrap_or_else(|| HeaderValue::from_static(fallback))
    };
    let content_type = header(fetched.content_type.as_deref(), DEFAULT_BINARY_TYPE);
    let cache_control = header(fetched.cache_control.as_deref(), DEFAULT_BINARY_CACHE);

    Ok((
        [(CONTENT_TYPE, content_type), (CACHE_CONTROL, cache_control)],
        fetched.body,
    )
        .into_response())
}

/// Serves the cached report while fresh. Concurrent misses wait for a single refresh.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusReport> {
    if let Some(report) = state.status_cache.get() {
        return Json(report);
    }

    let _refresh = state.refresh.lock().await;
    if let Some(report) = state.status_cache.get() {
        return Json(report);
    }

    let report = state.monitor.check_all(&state.targets).await;
    state.status_cache.store(report.clone());
    Json(report)
}

pub async fn sites(State(state): State<Arc<AppState>>) -> Json<Vec<SiteSummary>> {
    let sites = state
        .extractor
        .registry()
        .ranked()
        .into_iter()
        .map(|profile| SiteSummary {
            name: profile.name.clone(),
            domain: profile.domain.clone(),
            rank: profile.rank,
        })
        .collect();

    Json(sites)
}
