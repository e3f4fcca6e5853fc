//! Health and root endpoints.

use axum::Json;
use serde::Serialize;

use crate::error::ApiResult;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Root endpoint.
/// GET /
pub async fn root() -> ApiResult<Json<RootResponse>> {
    Ok(Json(RootResponse {
        message: "trawl API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Health check endpoint.
/// GET /health
pub async fn health_check() -> ApiResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
