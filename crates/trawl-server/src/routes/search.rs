//! Search endpoint.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use trawl_core::retrieval::{SearchOptions, SearchOutcome, SearchType};

/// Request body for the hybrid search.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// The search query.
    pub query: String,
    /// Which branches to run: document, web, or hybrid.
    #[serde(default = "default_search_type")]
    pub search_type: SearchType,
    /// Maximum results per branch.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Optional `source` metadata filter for dense retrieval.
    #[serde(default)]
    pub source_filter: Option<String>,
    /// Credibility floor applied uniformly to fused results.
    #[serde(default = "default_min_credibility")]
    pub min_credibility: f32,
    #[serde(default = "default_enable_cache")]
    pub enable_cache: bool,
}

fn default_search_type() -> SearchType {
    SearchType::Hybrid
}

fn default_k() -> usize {
    5
}

fn default_min_credibility() -> f32 {
    0.5
}

fn default_enable_cache() -> bool {
    true
}

/// Hybrid search combining documents and web sources.
/// POST /search
pub async fn hybrid_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchOutcome>> {
    if request.query.trim().is_empty() {
        return Err(ApiError::validation("query must not be empty"));
    }
    if request.k == 0 {
        return Err(ApiError::validation("k must be at least 1"));
    }

    let opts = SearchOptions {
        search_type: request.search_type,
        k: request.k,
        source_filter: request.source_filter,
        min_credibility: request.min_credibility,
        enable_cache: request.enable_cache,
    };

    let outcome = state
        .pipeline
        .search(&request.query, &opts)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"query": "solar panels"}"#).unwrap();
        assert_eq!(request.search_type, SearchType::Hybrid);
        assert_eq!(request.k, 5);
        assert!(request.source_filter.is_none());
        assert!((request.min_credibility - 0.5).abs() < f32::EPSILON);
        assert!(request.enable_cache);
    }

    #[test]
    fn test_request_explicit_fields() {
        let request: SearchRequest = serde_json::from_str(
            r#"{"query": "q", "search_type": "web", "k": 3, "min_credibility": 0.0, "enable_cache": false}"#,
        )
        .unwrap();
        assert_eq!(request.search_type, SearchType::Web);
        assert_eq!(request.k, 3);
        assert!(!request.enable_cache);
    }
}
