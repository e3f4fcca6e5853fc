//! Error types for trawl operations.

use thiserror::Error;

/// Result type alias for trawl operations.
pub type TrawlResult<T> = Result<T, TrawlError>;

/// Main error type for all trawl operations.
#[derive(Error, Debug)]
pub enum TrawlError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Sparse index operation failed.
    #[error("Index error: {message}")]
    Index { message: String },

    /// Index snapshot could not be read or written.
    #[error("Snapshot error: {message}")]
    Snapshot {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Dense retrieval (vector store) operation failed.
    #[error("Vector store error: {message}")]
    VectorStore { message: String },

    /// Embedding generation failed.
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Web search provider failed.
    #[error("Web search error: {message}")]
    WebSearch { message: String },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    /// Relevance scoring (reranker) failed.
    #[error("Rerank error: {message}")]
    Rerank { message: String },

    /// Response from a collaborator could not be parsed.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrawlError {
    /// Create an index error.
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index {
            message: message.into(),
        }
    }

    /// Create a snapshot error without an underlying source.
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot {
            message: message.into(),
            source: None,
        }
    }

    /// Create a vector store error.
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore {
            message: message.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a web search error.
    pub fn web_search(message: impl Into<String>) -> Self {
        Self::WebSearch {
            message: message.into(),
        }
    }

    /// Create a rate limit error.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Create a rerank error.
    pub fn rerank(message: impl Into<String>) -> Self {
        Self::Rerank {
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
