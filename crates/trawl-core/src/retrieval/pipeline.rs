//! Pipeline orchestration: fuse, deduplicate, synthesize, memoize.
//!
//! Runs the independent retrieval branches concurrently, sequences
//! ResultFuser -> ConflictResolver -> Synthesizer, and memoizes the whole
//! call in the TTL cache keyed by the query signature.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::citation::{generate_citation, CitationManager, CitationStyle};
use crate::error::TrawlResult;
use crate::traits::{DenseRetriever, RelevanceScorer, WebHit, WebSearcher};
use crate::types::{CandidateResult, Document, Metadata, Quality, ScalarValue, SynthesisResult};

use super::dedup::ConflictResolver;
use super::fusion::ResultFuser;
use super::sparse::SparseIndex;
use super::synthesis::Synthesizer;

/// How long a memoized response stays valid.
const RESPONSE_TTL: Duration = Duration::from_secs(3600);

/// How many fused results receive citations.
const CITATION_LIMIT: usize = 5;

/// Which retrieval branches a request exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Document,
    Web,
    Hybrid,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Web => "web",
            Self::Hybrid => "hybrid",
        }
    }

    fn wants_documents(&self) -> bool {
        matches!(self, Self::Document | Self::Hybrid)
    }

    fn wants_web(&self) -> bool {
        matches!(self, Self::Web | Self::Hybrid)
    }
}

/// Per-request knobs.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub search_type: SearchType,
    pub k: usize,
    /// Restricts dense retrieval to documents whose `source` metadata
    /// matches.
    pub source_filter: Option<String>,
    pub min_credibility: f32,
    pub enable_cache: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_type: SearchType::Hybrid,
            k: 5,
            source_filter: None,
            min_credibility: 0.5,
            enable_cache: true,
        }
    }
}

/// The response one pipeline run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub query: String,
    pub search_type: SearchType,
    /// The fused, credibility-floored candidate list, pre-dedup.
    pub results: Vec<CandidateResult>,
    pub total_results: usize,
    /// Elapsed seconds for this run (a cached response keeps the time of
    /// the run that produced it).
    pub response_time: f64,
    pub answer: String,
    /// Top-3 attributed sources, in relevance order.
    pub sources: Vec<CandidateResult>,
    pub citations: Vec<String>,
    pub confidence: f32,
    pub quality: Quality,
}

/// Deferred constructor for the relevance scorer.
pub type ScorerFactory = Box<dyn Fn() -> TrawlResult<Arc<dyn RelevanceScorer>> + Send + Sync>;

/// Orchestrates the full hybrid retrieval-and-synthesis run.
pub struct SearchPipeline {
    dense: Arc<dyn DenseRetriever>,
    sparse: Arc<SparseIndex>,
    web: Arc<dyn WebSearcher>,
    fuser: ResultFuser,
    resolver: ConflictResolver,
    /// The relevance model is expensive to bring up, so it is created on
    /// first use; concurrent first callers all block on the same
    /// initialization.
    scorer: OnceCell<Arc<dyn RelevanceScorer>>,
    scorer_factory: ScorerFactory,
    cache: TtlCache<SearchOutcome>,
    citations: CitationManager,
}

impl SearchPipeline {
    pub fn new(
        dense: Arc<dyn DenseRetriever>,
        sparse: Arc<SparseIndex>,
        web: Arc<dyn WebSearcher>,
        scorer_factory: ScorerFactory,
    ) -> Self {
        Self {
            dense,
            sparse,
            web,
            fuser: ResultFuser::default(),
            resolver: ConflictResolver::new(),
            scorer: OnceCell::new(),
            scorer_factory,
            cache: TtlCache::new(),
            citations: CitationManager::new(),
        }
    }

    /// Build with an already-initialized relevance scorer.
    pub fn with_scorer(
        dense: Arc<dyn DenseRetriever>,
        sparse: Arc<SparseIndex>,
        web: Arc<dyn WebSearcher>,
        scorer: Arc<dyn RelevanceScorer>,
    ) -> Self {
        let mut pipeline = Self::new(
            dense,
            sparse,
            web,
            // Never invoked: the cell below is pre-populated.
            Box::new(|| Err(crate::error::TrawlError::Internal("scorer factory unavailable".to_string()))),
        );
        pipeline.scorer = OnceCell::new_with(Some(scorer));
        pipeline
    }

    /// Replace the default fuser (e.g., with custom credibility lists).
    pub fn with_fuser(mut self, fuser: ResultFuser) -> Self {
        self.fuser = fuser;
        self
    }

    /// Run one hybrid search.
    ///
    /// A cache hit returns the stored outcome unchanged, with no re-scoring
    /// or re-fusion. A web-branch failure degrades to document-only
    /// results; a dense or sparse failure propagates.
    pub async fn search(&self, query: &str, opts: &SearchOptions) -> TrawlResult<SearchOutcome> {
        let started = Instant::now();
        let cache_key = format!("{}_{}_{}", query, opts.search_type.as_str(), opts.k);

        if opts.enable_cache {
            if let Some(cached) = self.cache.get(&cache_key) {
                debug!(key = %cache_key, "Response cache hit");
                return Ok(cached);
            }
        }

        let (dense, sparse, web) = tokio::join!(
            self.dense_branch(query, opts),
            self.sparse_branch(query, opts),
            self.web_branch(query, opts),
        );
        let dense = dense?;

        let fused = self.fuser.fuse(dense, sparse, web, opts.min_credibility);
        let deduped = self.resolver.resolve(fused.clone());

        let synthesis = if deduped.is_empty() {
            SynthesisResult::empty()
        } else {
            let scorer = self.scorer().await?;
            Synthesizer::new(scorer).synthesize(query, deduped).await?
        };

        let citations = self.cite(&fused);

        let outcome = SearchOutcome {
            query: query.to_string(),
            search_type: opts.search_type,
            total_results: fused.len(),
            results: fused,
            response_time: started.elapsed().as_secs_f64(),
            answer: synthesis.answer,
            sources: synthesis.sources,
            citations,
            confidence: synthesis.confidence,
            quality: synthesis.quality,
        };

        if opts.enable_cache {
            self.cache
                .set(cache_key, outcome.clone(), Some(RESPONSE_TTL));
        }
        Ok(outcome)
    }

    /// Drop all memoized responses.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// The shared sparse index, for ingestion-time administration.
    pub fn sparse_index(&self) -> &Arc<SparseIndex> {
        &self.sparse
    }

    pub fn citation_manager(&self) -> &CitationManager {
        &self.citations
    }

    async fn dense_branch(&self, query: &str, opts: &SearchOptions) -> TrawlResult<Vec<Document>> {
        if !opts.search_type.wants_documents() {
            return Ok(Vec::new());
        }
        let filter = opts.source_filter.as_ref().map(|source| {
            let mut meta = Metadata::new();
            meta.insert("source".to_string(), ScalarValue::from(source.clone()));
            meta
        });
        self.dense.search(query, opts.k, filter.as_ref()).await
    }

    async fn sparse_branch(&self, query: &str, opts: &SearchOptions) -> Vec<super::sparse::SparseHit> {
        if !opts.search_type.wants_documents() {
            return Vec::new();
        }
        self.sparse.search(query, opts.k)
    }

    async fn web_branch(&self, query: &str, opts: &SearchOptions) -> Vec<WebHit> {
        if !opts.search_type.wants_web() {
            return Vec::new();
        }
        match self.web.search(query, opts.k).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Web search failed; degrading to document-only results");
                Vec::new()
            }
        }
    }

    fn cite(&self, fused: &[CandidateResult]) -> Vec<String> {
        fused
            .iter()
            .take(CITATION_LIMIT)
            .map(|c| {
                self.citations.add(c.metadata.clone());
                generate_citation(&c.metadata, CitationStyle::Apa)
            })
            .collect()
    }

    async fn scorer(&self) -> TrawlResult<Arc<dyn RelevanceScorer>> {
        let scorer = self
            .scorer
            .get_or_try_init(|| async { (self.scorer_factory)() })
            .await?;
        Ok(Arc::clone(scorer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::TrawlError;
    use crate::types::SourceType;

    struct StaticDense {
        docs: Vec<Document>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StaticDense {
        fn with(docs: Vec<Document>) -> Self {
            Self {
                docs,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                docs: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DenseRetriever for StaticDense {
        async fn search(
            &self,
            _query: &str,
            k: usize,
            _filter: Option<&Metadata>,
        ) -> TrawlResult<Vec<Document>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TrawlError::vector_store("backend offline"));
            }
            Ok(self.docs.iter().take(k).cloned().collect())
        }
    }

    struct StaticWeb {
        hits: Vec<WebHit>,
        fail: bool,
    }

    #[async_trait]
    impl WebSearcher for StaticWeb {
        async fn search(&self, _query: &str, k: usize) -> TrawlResult<Vec<WebHit>> {
            if self.fail {
                return Err(TrawlError::web_search("provider down"));
            }
            Ok(self.hits.iter().take(k).cloned().collect())
        }
    }

    struct CountingScorer {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RelevanceScorer for CountingScorer {
        async fn score_batch(&self, _query: &str, texts: &[String]) -> TrawlResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| 0.6).collect())
        }

        fn model_name(&self) -> &str {
            "counting-scorer"
        }
    }

    fn doc(content: &str) -> Document {
        Document::new(content, Metadata::new())
    }

    fn web_hit(snippet: &str) -> WebHit {
        WebHit {
            title: "title".to_string(),
            link: "https://en.wikipedia.org/wiki/x".to_string(),
            snippet: snippet.to_string(),
            published: None,
        }
    }

    fn pipeline_with(
        dense: StaticDense,
        sparse_docs: &[Document],
        web: StaticWeb,
        scorer_calls: Arc<AtomicUsize>,
    ) -> SearchPipeline {
        let sparse = Arc::new(SparseIndex::new());
        if !sparse_docs.is_empty() {
            sparse.build(sparse_docs);
        }
        SearchPipeline::with_scorer(
            Arc::new(dense),
            sparse,
            Arc::new(web),
            Arc::new(CountingScorer {
                calls: scorer_calls,
            }),
        )
    }

    #[tokio::test]
    async fn test_hybrid_run_fuses_all_branches() {
        let pipeline = pipeline_with(
            StaticDense::with(vec![doc("dense snippet")]),
            &[doc("sparse snippet about retrieval")],
            StaticWeb {
                hits: vec![web_hit("web snippet")],
                fail: false,
            },
            Arc::new(AtomicUsize::new(0)),
        );

        let outcome = pipeline
            .search(
                "retrieval",
                &SearchOptions {
                    min_credibility: 0.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.total_results, 3);
        assert_eq!(outcome.results.len(), 3);
        assert!(outcome
            .results
            .iter()
            .any(|c| c.source_type == SourceType::Web));
        assert!(!outcome.answer.is_empty());
        assert_eq!(outcome.citations.len(), 3);
        assert!((outcome.confidence - 0.6).abs() < 1e-6);
        assert_eq!(outcome.quality, Quality::Medium);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_rescoring() {
        let scorer_calls = Arc::new(AtomicUsize::new(0));
        let pipeline = pipeline_with(
            StaticDense::with(vec![doc("dense snippet")]),
            &[],
            StaticWeb {
                hits: vec![],
                fail: false,
            },
            Arc::clone(&scorer_calls),
        );

        let opts = SearchOptions::default();
        let first = pipeline.search("query", &opts).await.unwrap();
        let second = pipeline.search("query", &opts).await.unwrap();

        assert_eq!(scorer_calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.answer, second.answer);
        assert_eq!(first.response_time, second.response_time);
    }

    #[tokio::test]
    async fn test_cache_disabled_recomputes() {
        let scorer_calls = Arc::new(AtomicUsize::new(0));
        let pipeline = pipeline_with(
            StaticDense::with(vec![doc("dense snippet")]),
            &[],
            StaticWeb {
                hits: vec![],
                fail: false,
            },
            Arc::clone(&scorer_calls),
        );

        let opts = SearchOptions {
            enable_cache: false,
            ..Default::default()
        };
        pipeline.search("query", &opts).await.unwrap();
        pipeline.search("query", &opts).await.unwrap();
        assert_eq!(scorer_calls.load(Ordering::SeqCst), 2);
        assert_eq!(pipeline.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_web_failure_degrades_to_documents() {
        let pipeline = pipeline_with(
            StaticDense::with(vec![doc("dense snippet")]),
            &[],
            StaticWeb {
                hits: vec![],
                fail: true,
            },
            Arc::new(AtomicUsize::new(0)),
        );

        let outcome = pipeline
            .search("query", &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.total_results, 1);
        assert_eq!(outcome.results[0].source_type, SourceType::Document);
    }

    #[tokio::test]
    async fn test_dense_failure_propagates() {
        let pipeline = pipeline_with(
            StaticDense::failing(),
            &[],
            StaticWeb {
                hits: vec![web_hit("web snippet")],
                fail: false,
            },
            Arc::new(AtomicUsize::new(0)),
        );

        let err = pipeline
            .search("query", &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TrawlError::VectorStore { .. }));
    }

    #[tokio::test]
    async fn test_document_type_skips_web() {
        let pipeline = pipeline_with(
            StaticDense::with(vec![doc("dense snippet")]),
            &[],
            StaticWeb {
                hits: vec![web_hit("web snippet")],
                fail: false,
            },
            Arc::new(AtomicUsize::new(0)),
        );

        let outcome = pipeline
            .search(
                "query",
                &SearchOptions {
                    search_type: SearchType::Document,
                    min_credibility: 0.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(outcome
            .results
            .iter()
            .all(|c| c.source_type == SourceType::Document));
    }

    #[tokio::test]
    async fn test_web_type_skips_document_branches() {
        let dense = StaticDense::with(vec![doc("dense snippet")]);
        let pipeline = pipeline_with(
            dense,
            &[doc("sparse snippet")],
            StaticWeb {
                hits: vec![web_hit("web snippet")],
                fail: false,
            },
            Arc::new(AtomicUsize::new(0)),
        );

        let outcome = pipeline
            .search(
                "snippet",
                &SearchOptions {
                    search_type: SearchType::Web,
                    min_credibility: 0.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.total_results, 1);
        assert_eq!(outcome.results[0].source_type, SourceType::Web);
    }

    #[tokio::test]
    async fn test_duplicate_content_collapses_in_sources() {
        // Same snippet from dense and web; results keep both, synthesis
        // sees one.
        let pipeline = pipeline_with(
            StaticDense::with(vec![doc("shared snippet")]),
            &[],
            StaticWeb {
                hits: vec![WebHit {
                    snippet: "shared snippet".to_string(),
                    ..web_hit("")
                }],
                fail: false,
            },
            Arc::new(AtomicUsize::new(0)),
        );

        let outcome = pipeline
            .search(
                "query",
                &SearchOptions {
                    min_credibility: 0.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.total_results, 2);
        assert_eq!(outcome.sources.len(), 1);
        assert_eq!(outcome.answer, "shared snippet");
    }

    #[tokio::test]
    async fn test_empty_everything_yields_low_quality() {
        let pipeline = pipeline_with(
            StaticDense::with(vec![]),
            &[],
            StaticWeb {
                hits: vec![],
                fail: false,
            },
            Arc::new(AtomicUsize::new(0)),
        );

        let outcome = pipeline
            .search("query", &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.total_results, 0);
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.quality, Quality::Low);
        assert!(outcome.answer.is_empty());
        assert!(outcome.citations.is_empty());
    }

    #[tokio::test]
    async fn test_lazy_scorer_initialized_once_under_concurrency() {
        let inits = Arc::new(AtomicUsize::new(0));
        let scorer_inits = Arc::clone(&inits);

        let sparse = Arc::new(SparseIndex::new());
        let pipeline = Arc::new(SearchPipeline::new(
            Arc::new(StaticDense::with(vec![doc("dense snippet")])),
            sparse,
            Arc::new(StaticWeb {
                hits: vec![],
                fail: false,
            }),
            Box::new(move || {
                scorer_inits.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(CountingScorer {
                    calls: Arc::new(AtomicUsize::new(0)),
                }) as Arc<dyn RelevanceScorer>)
            }),
        ));

        let mut handles = Vec::new();
        for i in 0..8 {
            let pipeline = Arc::clone(&pipeline);
            handles.push(tokio::spawn(async move {
                let opts = SearchOptions {
                    enable_cache: false,
                    ..Default::default()
                };
                pipeline.search(&format!("query {i}"), &opts).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }
}
