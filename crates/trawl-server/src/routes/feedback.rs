//! Ratings feedback endpoint.

use std::time::Duration;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Ratings are kept in the telemetry cache for a day.
const RATING_TTL: Duration = Duration::from_secs(86_400);

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub query: String,
    /// 1 to 5.
    pub rating: u8,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub status: String,
    pub rating: u8,
}

/// Submit a rating for a past query.
/// POST /feedback/rating
pub async fn submit_rating(
    State(state): State<AppState>,
    Json(request): Json<RatingRequest>,
) -> ApiResult<Json<RatingResponse>> {
    if !(1..=5).contains(&request.rating) {
        return Err(ApiError::validation("rating must be between 1 and 5"));
    }

    let record = json!({
        "query": request.query,
        "rating": request.rating,
        "feedback": request.feedback,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    state
        .telemetry
        .set(format!("rating_{}", request.query), record, Some(RATING_TTL));

    Ok(Json(RatingResponse {
        status: "rating_submitted".to_string(),
        rating: request.rating,
    }))
}
