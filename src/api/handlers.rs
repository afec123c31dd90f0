//! API Handlers
//!
//! HTTP request handlers for each orbit cache endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::debug;

use crate::config::Config;
use crate::error::{OrbitError, Result};
use crate::models::{
    HealthResponse, PositionQuery, PositionResponse, StatsResponse, TransformsRequest,
    TransformsResponse,
};
use crate::orbit::{wrap_time, KeplerPropagator, Transform};
use crate::service::{ElementProvider, OrbitService, TransformRequest};

/// Application state shared across all handlers.
///
/// Contains the orbit service wrapped in Arc<RwLock<>>. Every cache access
/// takes the write lock, so cache operations are serialized.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RwLock<OrbitService>>,
}

impl AppState {
    /// Creates a new AppState with the given service.
    pub fn new(service: OrbitService) -> Self {
        Self {
            service: Arc::new(RwLock::new(service)),
        }
    }

    /// Creates a new AppState from configuration and an element provider.
    pub fn from_config(config: &Config, provider: Arc<dyn ElementProvider>) -> Self {
        Self::new(OrbitService::new(
            config.cache_config(),
            provider,
            config.epoch_seconds,
        ))
    }
}

/// Handler for POST /transforms
///
/// Returns transforms of one object over `[start_time, start_time + duration)`
/// sampled at `frequency`. Propagation runs on the blocking pool.
pub async fn transforms_handler(
    State(state): State<AppState>,
    Json(req): Json<TransformsRequest>,
) -> Result<Json<TransformsResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(OrbitError::InvalidRequest(error_msg));
    }

    let service = Arc::clone(&state.service);
    let object_id = req.object_id.clone();
    let samples = tokio::task::spawn_blocking(move || {
        // Write lock: lookups touch recency and may compute or prefetch
        let mut service = service.blocking_write();
        compute_transforms(&mut service, &req)
    })
    .await
    .map_err(|e| OrbitError::Internal(format!("transform task failed: {}", e)))??;

    Ok(Json(TransformsResponse::new(object_id, samples)))
}

fn compute_transforms(service: &mut OrbitService, req: &TransformsRequest) -> Result<Vec<Transform>> {
    let body = service.resolve_body(&req.object_id, req.elements, req.rotation)?;

    let start_time_s = if req.wrap_to_period {
        let period_s = KeplerPropagator::new(&body.elements, service.epoch_s())?.period_s();
        wrap_time(req.start_time, period_s)
    } else {
        req.start_time
    };
    debug!(object = %req.object_id, start_time_s, duration = req.duration, "transforms requested");

    service.get_transforms(&TransformRequest {
        object_id: req.object_id.clone(),
        start_time_s,
        duration_s: req.duration,
        frequency_hz: req.frequency,
        elements: body.elements,
        rotation: body.rotation,
    })
}

/// Handler for GET /bodies/:id/position
///
/// Returns the position of a catalogued body summed along its primary chain.
pub async fn position_handler(
    State(state): State<AppState>,
    Path(object_id): Path<String>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<PositionResponse>> {
    if !query.time.is_finite() {
        return Err(OrbitError::InvalidRequest("time must be finite".to_string()));
    }

    // Read lock: positions bypass the cache
    let service = state.service.read().await;
    let chain = service.primary_chain(&object_id)?;
    let position = service.absolute_position(&object_id, query.time)?;

    Ok(Json(PositionResponse::new(object_id, query.time, chain, position)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let service = state.service.read().await;
    Json(StatsResponse::from(service.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
