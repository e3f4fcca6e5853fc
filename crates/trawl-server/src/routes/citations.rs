//! Citation formatting endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;
use trawl_core::citation::CitationStyle;

#[derive(Debug, Deserialize)]
pub struct CitationParams {
    #[serde(default = "default_style")]
    pub style: String,
}

fn default_style() -> String {
    "APA".to_string()
}

#[derive(Debug, Serialize)]
pub struct CitationsResponse {
    pub style: String,
    pub citations: Vec<String>,
}

/// Formatted citations for every source cited so far.
/// GET /citations?style=APA
pub async fn get_citations(
    State(state): State<AppState>,
    Query(params): Query<CitationParams>,
) -> ApiResult<Json<CitationsResponse>> {
    let style = CitationStyle::parse(&params.style);
    let citations = state.pipeline.citation_manager().format_all(style);

    Ok(Json(CitationsResponse {
        style: params.style,
        citations,
    }))
}
