//! trawl-core - Core library for trawl.
//!
//! This crate provides the types, traits, and the hybrid
//! retrieval-and-synthesis pipeline behind trawl: a BM25 sparse index with
//! JSON snapshot persistence, credibility scoring for web results, score
//! fusion across retrieval branches, exact-content deduplication, and
//! extractive answer synthesis, all memoized behind a TTL response cache.
//!
//! # Example
//!
//! ```ignore
//! use trawl_core::{SearchOptions, SearchPipeline};
//!
//! let pipeline = SearchPipeline::with_scorer(dense, sparse, web, scorer);
//!
//! let outcome = pipeline.search("solar panel maintenance", &SearchOptions::default()).await?;
//! println!("{} ({:?})", outcome.answer, outcome.quality);
//! ```

pub mod cache;
pub mod citation;
pub mod credibility;
pub mod error;
pub mod retrieval;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use cache::TtlCache;
pub use citation::{generate_citation, verify_citation, CitationManager, CitationStyle};
pub use credibility::{CredibilityConfig, CredibilityScorer, DomainReputation};
pub use error::{TrawlError, TrawlResult};
pub use retrieval::{
    ConflictResolver, ResultFuser, SearchOptions, SearchOutcome, SearchPipeline, SearchType,
    SparseHit, SparseIndex, Synthesizer, TokenPipeline,
};
pub use traits::{DenseRetriever, RelevanceScorer, WebHit, WebSearcher};
pub use types::{
    CandidateResult, Document, Metadata, Quality, ScalarValue, SourceType, SynthesisResult,
};
