//! Server state management.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use trawl_core::cache::TtlCache;
use trawl_core::retrieval::SearchPipeline;
use trawl_vector_stores::ChromaDenseRetriever;

/// One user's in-memory session bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct UserSession {
    pub id: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub search_history: Vec<HistoryRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub query: String,
    pub results_count: usize,
    pub timestamp: String,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SearchPipeline>,
    /// Concrete handle to the dense store for document administration.
    pub documents: Arc<ChromaDenseRetriever>,
    /// Ratings and query telemetry, expiring after a day.
    pub telemetry: Arc<TtlCache<serde_json::Value>>,
    pub sessions: Arc<RwLock<HashMap<String, UserSession>>>,
}

impl AppState {
    pub fn new(pipeline: Arc<SearchPipeline>, documents: Arc<ChromaDenseRetriever>) -> Self {
        Self {
            pipeline,
            documents,
            telemetry: Arc::new(TtlCache::new()),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get or create the session for `user_id`, returning a snapshot of it.
    pub async fn session(&self, user_id: &str) -> UserSession {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| UserSession {
                id: user_id.to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
                name: None,
                search_history: Vec::new(),
            })
            .clone()
    }
}
