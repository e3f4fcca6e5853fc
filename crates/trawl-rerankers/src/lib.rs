//! trawl-rerankers - Relevance scorer implementations for trawl.

pub mod http;

pub use http::HttpRelevanceScorer;
