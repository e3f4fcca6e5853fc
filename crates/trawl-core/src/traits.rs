//! Collaborator traits consumed by the retrieval pipeline.
//!
//! Dense retrieval, web search, and relevance scoring are external services
//! from the pipeline's perspective; these traits are the seams they plug
//! into.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TrawlResult;
use crate::types::{Document, Metadata};

/// Dense (embedding-based) retrieval backend.
#[async_trait]
pub trait DenseRetriever: Send + Sync {
    /// Similarity-search for the `k` documents closest to `query`,
    /// optionally restricted by a metadata filter.
    async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&Metadata>,
    ) -> TrawlResult<Vec<Document>>;
}

/// A single result from a web-search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// ISO-8601 publication timestamp, when the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

/// Live web-search provider.
///
/// Implementations are expected to degrade gracefully (empty or mock
/// results) when the upstream service is unavailable rather than fail the
/// whole request; the pipeline additionally isolates this branch.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> TrawlResult<Vec<WebHit>>;
}

/// Pairwise query/text relevance scorer (cross-encoder style).
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score each text against the query. Returns one score per input text,
    /// in input order.
    async fn score_batch(&self, query: &str, texts: &[String]) -> TrawlResult<Vec<f32>>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}
