//! Session and history endpoints.
//!
//! Sessions are in-memory bookkeeping keyed by user id; they do not survive
//! a restart.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::{AppState, HistoryRecord, UserSession};

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub user_id: String,
    #[serde(default)]
    pub session_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub session: UserSession,
}

#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub results: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub search_history: Vec<HistoryRecord>,
}

#[derive(Debug, Serialize)]
pub struct HistoryAddedResponse {
    pub status: String,
    pub history_length: usize,
}

/// Create (or fetch) a user session.
/// POST /sessions/create
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    state.session(&request.user_id).await;

    let session = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&request.user_id)
            .ok_or_else(|| crate::error::ApiError::internal("session vanished"))?;
        if let Some(name) = request.session_name {
            session.name = Some(name);
        }
        session.clone()
    };

    Ok(Json(SessionResponse {
        session_id: request.user_id,
        session,
    }))
}

/// Get a user's search history.
/// GET /sessions/:user_id/history
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<HistoryResponse>> {
    let session = state.session(&user_id).await;

    Ok(Json(HistoryResponse {
        user_id,
        search_history: session.search_history,
    }))
}

/// Append a search to a user's history.
/// POST /sessions/:user_id/history
pub async fn add_to_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(entry): Json<HistoryEntry>,
) -> ApiResult<Json<HistoryAddedResponse>> {
    state.session(&user_id).await;

    let history_length = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&user_id)
            .ok_or_else(|| crate::error::ApiError::internal("session vanished"))?;
        session.search_history.push(HistoryRecord {
            query: entry.query,
            results_count: entry.results,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        session.search_history.len()
    };

    Ok(Json(HistoryAddedResponse {
        status: "added".to_string(),
        history_length,
    }))
}
