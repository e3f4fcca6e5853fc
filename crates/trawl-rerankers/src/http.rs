//! HTTP cross-encoder relevance scorer.
//!
//! Talks to a text-embeddings-inference style `/rerank` endpoint hosting a
//! pairwise cross-encoder (e.g. `cross-encoder/ms-marco-MiniLM-L-6-v2`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use trawl_core::error::{TrawlError, TrawlResult};
use trawl_core::traits::RelevanceScorer;

const DEFAULT_MODEL: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";

/// Relevance scorer backed by an HTTP rerank service.
pub struct HttpRelevanceScorer {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct RerankRequest {
    query: String,
    texts: Vec<String>,
    raw_scores: bool,
}

#[derive(Debug, Deserialize)]
struct RerankEntry {
    index: usize,
    score: f32,
}

impl HttpRelevanceScorer {
    pub fn new(base_url: impl Into<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Read `RERANKER_URL` (and optional `RERANKER_MODEL`) from the
    /// environment.
    pub fn from_env() -> TrawlResult<Self> {
        let base_url = std::env::var("RERANKER_URL").map_err(|_| {
            TrawlError::Configuration(
                "Reranker URL required. Set RERANKER_URL.".to_string(),
            )
        })?;
        Ok(Self::new(base_url, std::env::var("RERANKER_MODEL").ok()))
    }
}

#[async_trait]
impl RelevanceScorer for HttpRelevanceScorer {
    /// Score every (query, text) pair in one call.
    ///
    /// The service returns entries in relevance order; they are mapped back
    /// to input positions so the caller gets one score per text, in order.
    async fn score_batch(&self, query: &str, texts: &[String]) -> TrawlResult<Vec<f32>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = RerankRequest {
            query: query.to_string(),
            texts: texts.to_vec(),
            raw_scores: false,
        };

        let response = self
            .client
            .post(format!("{}/rerank", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| TrawlError::rerank(format!("Failed to call rerank service: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(TrawlError::rerank(format!("Rerank service error: {}", error)));
        }

        let entries: Vec<RerankEntry> = response
            .json()
            .await
            .map_err(|e| TrawlError::rerank(format!("Failed to parse response: {}", e)))?;

        let mut scores = vec![0.0_f32; texts.len()];
        for entry in entries {
            if entry.index >= scores.len() {
                return Err(TrawlError::rerank(format!(
                    "Rerank service returned out-of-range index {}",
                    entry.index
                )));
            }
            scores[entry.index] = entry.score;
        }
        Ok(scores)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_name() {
        let scorer = HttpRelevanceScorer::new("http://localhost:8080", None);
        assert_eq!(scorer.model_name(), "cross-encoder/ms-marco-MiniLM-L-6-v2");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let scorer = HttpRelevanceScorer::new("http://rerank:8080/", None);
        assert_eq!(scorer.base_url, "http://rerank:8080");
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        let scorer = HttpRelevanceScorer::new("http://localhost:1", None);
        let scores = scorer.score_batch("query", &[]).await.unwrap();
        assert!(scores.is_empty());
    }
}
