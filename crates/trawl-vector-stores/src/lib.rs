//! trawl-vector-stores - Dense retrieval backends for trawl.
//!
//! Provides the Chroma-backed [`ChromaDenseRetriever`] and the
//! [`OllamaEmbeddings`] client it embeds with.

pub mod chroma;
pub mod ollama;

pub use chroma::{ChromaConfig, ChromaDenseRetriever};
pub use ollama::OllamaEmbeddings;
