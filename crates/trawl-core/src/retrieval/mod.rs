//! Retrieval: sparse BM25 search, score fusion, deduplication, and the
//! orchestrating pipeline.

pub mod dedup;
pub mod fusion;
pub mod pipeline;
pub mod sparse;
pub mod synthesis;
pub mod tokenize;

pub use dedup::ConflictResolver;
pub use fusion::{ResultFuser, DENSE_PLACEHOLDER_SCORE};
pub use pipeline::{ScorerFactory, SearchOptions, SearchOutcome, SearchPipeline, SearchType};
pub use sparse::{SparseHit, SparseIndex};
pub use synthesis::Synthesizer;
pub use tokenize::{TokenPipeline, Tokenizer, WhitespaceTokenizer, WordTokenizer};
