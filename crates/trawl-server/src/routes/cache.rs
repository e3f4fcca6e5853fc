//! Cache administration endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClearCachesResponse {
    pub status: String,
}

/// Clear the response and telemetry caches.
/// POST /cache/clear
pub async fn clear_caches(State(state): State<AppState>) -> ApiResult<Json<ClearCachesResponse>> {
    state.pipeline.clear_cache();
    state.telemetry.clear();

    Ok(Json(ClearCachesResponse {
        status: "caches_cleared".to_string(),
    }))
}
