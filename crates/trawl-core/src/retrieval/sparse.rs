//! Okapi BM25 sparse index over a tokenized in-memory corpus.
//!
//! Maintains per-term document frequencies and average document length,
//! answers ranked lexical queries, and persists to a versioned JSON
//! snapshot. Reads are lock-shared; `build`/`add`/`rebuild` take the
//! exclusive side, so a search never observes a half-updated corpus.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{TrawlError, TrawlResult};
use crate::types::{Document, Metadata};

use super::tokenize::TokenPipeline;

/// BM25 term-frequency saturation parameter.
const K1: f64 = 1.5;
/// BM25 length-normalization parameter.
const B: f64 = 0.75;

/// Snapshot schema version. A mismatch reads as "absent snapshot".
const SNAPSHOT_VERSION: u32 = 1;

/// A document after tokenization; 1:1 with the ingested [`Document`] and
/// never mutated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub tokens: Vec<String>,
    pub metadata: Metadata,
    pub content: String,
}

/// A ranked hit from the sparse index. `score` is the raw BM25 score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseHit {
    pub content: String,
    pub metadata: Metadata,
    pub score: f32,
}

/// Corpus plus the aggregate statistics BM25 needs.
///
/// Invariant: `term_doc_frequency` and `avg_doc_length` are recomputed on
/// every mutation, so they are always consistent with `documents`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexState {
    documents: Vec<IndexedDocument>,
    term_doc_frequency: HashMap<String, usize>,
    avg_doc_length: f64,
}

impl IndexState {
    fn recompute_statistics(&mut self) {
        let mut tdf: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for doc in &self.documents {
            total_len += doc.tokens.len();
            let mut seen: Vec<&str> = doc.tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *tdf.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        self.term_doc_frequency = tdf;
        self.avg_doc_length = if self.documents.is_empty() {
            0.0
        } else {
            total_len as f64 / self.documents.len() as f64
        };
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    documents: Vec<IndexedDocument>,
    term_doc_frequency: HashMap<String, usize>,
    avg_doc_length: f64,
}

/// BM25 index shared across all queries.
///
/// Mutation is rare (ingestion time) relative to read-heavy `search`, so an
/// interior `RwLock` lets many searches run concurrently while excluding
/// them during a rebuild.
pub struct SparseIndex {
    state: RwLock<IndexState>,
    pipeline: TokenPipeline,
    snapshot_path: Option<PathBuf>,
}

impl SparseIndex {
    /// Create an empty, non-persistent index with the default tokenizer.
    pub fn new() -> Self {
        Self::with_pipeline(TokenPipeline::default())
    }

    pub fn with_pipeline(pipeline: TokenPipeline) -> Self {
        Self {
            state: RwLock::new(IndexState::default()),
            pipeline,
            snapshot_path: None,
        }
    }

    /// Attach a snapshot location for persistence.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Load an existing snapshot if present, apply `new_documents` on top
    /// (incremental `add` for a non-empty snapshot, full `build` for an
    /// empty one), and persist the result.
    ///
    /// A missing or corrupt snapshot is not fatal: the index starts empty.
    /// A failed persist leaves the in-memory index authoritative.
    pub fn load_or_create(
        pipeline: TokenPipeline,
        snapshot_path: impl Into<PathBuf>,
        new_documents: Option<&[Document]>,
    ) -> Self {
        let index = Self::with_pipeline(pipeline).with_snapshot_path(snapshot_path);

        if let Some(loaded) = index.try_load_snapshot() {
            *index.state.write().expect("index lock poisoned") = loaded;
        }

        if let Some(docs) = new_documents {
            if !docs.is_empty() {
                if index.is_empty() {
                    index.build(docs);
                } else {
                    index.add(docs);
                }
                if let Err(e) = index.persist() {
                    warn!(error = %e, "Failed to persist sparse index; in-memory index remains authoritative");
                }
            }
        }

        index
    }

    /// Replace the corpus with a fresh tokenization of `documents`.
    pub fn build(&self, documents: &[Document]) {
        let indexed: Vec<IndexedDocument> = documents
            .iter()
            .map(|d| self.index_document(d))
            .collect();

        let mut state = self.state.write().expect("index lock poisoned");
        state.documents = indexed;
        state.recompute_statistics();
        info!(documents = state.documents.len(), "Built sparse index");
    }

    /// Append newly tokenized documents and recompute aggregate statistics.
    ///
    /// Equivalent in result to a full rebuild over the combined corpus.
    pub fn add(&self, documents: &[Document]) {
        let indexed: Vec<IndexedDocument> = documents
            .iter()
            .map(|d| self.index_document(d))
            .collect();

        let mut state = self.state.write().expect("index lock poisoned");
        state.documents.extend(indexed);
        state.recompute_statistics();
        info!(documents = state.documents.len(), "Extended sparse index");
    }

    /// Discard any persisted state, build fresh from `documents`, persist.
    pub fn rebuild(&self, documents: &[Document]) {
        self.build(documents);
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist rebuilt sparse index");
        }
    }

    /// Rank the corpus against `query`.
    ///
    /// Returns only strictly positive BM25 scores, ordered descending, ties
    /// broken by insertion order, truncated to `k`.
    pub fn search(&self, query: &str, k: usize) -> Vec<SparseHit> {
        let q_tokens = self.pipeline.tokenize(query);
        if q_tokens.is_empty() {
            return Vec::new();
        }

        let state = self.state.read().expect("index lock poisoned");
        if state.documents.is_empty() {
            return Vec::new();
        }

        let n = state.documents.len() as f64;
        let avgdl = state.avg_doc_length;

        let mut hits: Vec<SparseHit> = state
            .documents
            .iter()
            .filter_map(|doc| {
                let score = Self::bm25_score(&q_tokens, doc, &state.term_doc_frequency, n, avgdl);
                if score > 0.0 {
                    Some(SparseHit {
                        content: doc.content.clone(),
                        metadata: doc.metadata.clone(),
                        score: score as f32,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stable sort keeps insertion order for equal scores.
        hits.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
        hits.truncate(k);
        hits
    }

    /// Number of indexed documents.
    pub fn doc_count(&self) -> usize {
        self.state.read().expect("index lock poisoned").documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_count() == 0
    }

    /// Write the current state to the snapshot location, atomically
    /// (temp file + rename), so a crash never leaves a torn snapshot.
    pub fn persist(&self) -> TrawlResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let snapshot = {
            let state = self.state.read().expect("index lock poisoned");
            Snapshot {
                version: SNAPSHOT_VERSION,
                documents: state.documents.clone(),
                term_doc_frequency: state.term_doc_frequency.clone(),
                avg_doc_length: state.avg_doc_length,
            }
        };

        let bytes = serde_json::to_vec(&snapshot)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn index_document(&self, doc: &Document) -> IndexedDocument {
        IndexedDocument {
            tokens: self.pipeline.tokenize(&doc.content),
            metadata: doc.metadata.clone(),
            content: doc.content.clone(),
        }
    }

    /// Sum of per-term BM25 contributions; repeated query terms contribute
    /// once per occurrence, as in the reference formulation.
    fn bm25_score(
        q_tokens: &[String],
        doc: &IndexedDocument,
        term_doc_frequency: &HashMap<String, usize>,
        n: f64,
        avgdl: f64,
    ) -> f64 {
        let doc_len = doc.tokens.len() as f64;

        q_tokens
            .iter()
            .map(|term| {
                let tf = doc.tokens.iter().filter(|t| *t == term).count() as f64;
                if tf == 0.0 {
                    return 0.0;
                }
                let df = term_doc_frequency.get(term).copied().unwrap_or(0) as f64;
                let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                let norm = if avgdl > 0.0 { doc_len / avgdl } else { 0.0 };
                idf * tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * norm))
            })
            .sum()
    }

    fn try_load_snapshot(&self) -> Option<IndexState> {
        let path = self.snapshot_path.as_ref()?;
        if !path.exists() {
            return None;
        }

        match Self::read_snapshot(path) {
            Ok(snapshot) => {
                if snapshot.version != SNAPSHOT_VERSION {
                    warn!(
                        found = snapshot.version,
                        expected = SNAPSHOT_VERSION,
                        "Sparse index snapshot version mismatch; starting empty"
                    );
                    return None;
                }
                info!(documents = snapshot.documents.len(), "Loaded sparse index snapshot");
                Some(IndexState {
                    documents: snapshot.documents,
                    term_doc_frequency: snapshot.term_doc_frequency,
                    avg_doc_length: snapshot.avg_doc_length,
                })
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to load sparse index snapshot; starting empty");
                None
            }
        }
    }

    fn read_snapshot(path: &Path) -> TrawlResult<Snapshot> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| TrawlError::Snapshot {
            message: format!("Corrupt snapshot at {}", path.display()),
            source: Some(Box::new(e)),
        })
    }
}

impl Default for SparseIndex {
    fn default() -> Self {
        Self::new()
    }
}
