//! Route definitions for the REST API.

mod analytics;
mod cache;
mod citations;
mod documents;
mod feedback;
mod health;
mod search;
mod sessions;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Search
        .route("/search", post(search::hybrid_search))
        // Document and index administration
        .route("/documents", post(documents::add_documents))
        .route("/documents/:doc_id", delete(documents::remove_document))
        .route("/index/rebuild", post(documents::rebuild_index))
        // Cache administration
        .route("/cache/clear", post(cache::clear_caches))
        // Sessions
        .route("/sessions/create", post(sessions::create_session))
        .route("/sessions/:user_id/history", get(sessions::get_history))
        .route("/sessions/:user_id/history", post(sessions::add_to_history))
        // Feedback and analytics
        .route("/feedback/rating", post(feedback::submit_rating))
        .route("/analytics/queries", get(analytics::query_analytics))
        // Citations
        .route("/citations", get(citations::get_citations))
        // Attach state
        .with_state(state)
}

pub use analytics::*;
pub use cache::*;
pub use citations::*;
pub use documents::*;
pub use feedback::*;
pub use health::*;
pub use search::*;
pub use sessions::*;
