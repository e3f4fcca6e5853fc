//! Query analytics endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct QueryAnalyticsResponse {
    /// Telemetry entries still within their TTL.
    pub total_queries: usize,
    /// Responses currently memoized.
    pub cached_responses: usize,
    /// Citations collected across searches.
    pub citations_collected: usize,
}

/// Analytics over recent queries and ratings.
/// GET /analytics/queries
pub async fn query_analytics(
    State(state): State<AppState>,
) -> ApiResult<Json<QueryAnalyticsResponse>> {
    Ok(Json(QueryAnalyticsResponse {
        total_queries: state.telemetry.len(),
        cached_responses: state.pipeline.cache_len(),
        citations_collected: state.pipeline.citation_manager().len(),
    }))
}
