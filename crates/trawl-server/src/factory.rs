//! Factory for assembling the search pipeline from environment config.

use std::sync::Arc;

use trawl_core::error::TrawlResult;
use trawl_core::retrieval::{SearchPipeline, SparseIndex, TokenPipeline};
use trawl_core::traits::RelevanceScorer;
use trawl_rerankers::HttpRelevanceScorer;
use trawl_vector_stores::{ChromaConfig, ChromaDenseRetriever, OllamaEmbeddings};
use trawl_web::SerperClient;

const DEFAULT_SNAPSHOT_PATH: &str = "bm25_index.json";

/// Environment-driven settings for the pipeline and its collaborators.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub chroma_url: Option<String>,
    pub chroma_collection: Option<String>,
    pub ollama_host: Option<String>,
    pub ollama_model: Option<String>,
    pub snapshot_path: String,
}

impl PipelineSettings {
    pub fn from_env() -> Self {
        // Some deployments configure the full embeddings endpoint; the
        // client wants the base URL.
        let ollama_host = std::env::var("OLLAMA_HOST").ok().map(|h| {
            h.trim_end_matches("/api/embeddings")
                .trim_end_matches('/')
                .to_string()
        });

        Self {
            chroma_url: std::env::var("CHROMA_URL").ok(),
            chroma_collection: std::env::var("CHROMA_COLLECTION").ok(),
            ollama_host,
            ollama_model: std::env::var("OLLAMA_EMBED_MODEL").ok(),
            snapshot_path: std::env::var("TRAWL_SNAPSHOT_PATH")
                .unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string()),
        }
    }
}

/// Build the pipeline and the concrete dense store handle.
///
/// The relevance scorer is constructed lazily on first synthesis, so a
/// missing `RERANKER_URL` only fails the first search that needs it.
pub fn build_pipeline(
    settings: &PipelineSettings,
) -> TrawlResult<(Arc<SearchPipeline>, Arc<ChromaDenseRetriever>)> {
    let embedder = OllamaEmbeddings::new(
        settings.ollama_host.clone(),
        settings.ollama_model.clone(),
    )?;

    let mut chroma_config = ChromaConfig::default();
    if let Some(url) = &settings.chroma_url {
        chroma_config.base_url = url.clone();
    }
    if let Some(collection) = &settings.chroma_collection {
        chroma_config.collection = collection.clone();
    }
    let documents = Arc::new(ChromaDenseRetriever::new(chroma_config, embedder));

    let sparse = Arc::new(SparseIndex::load_or_create(
        TokenPipeline::default(),
        &settings.snapshot_path,
        None,
    ));

    let web = Arc::new(SerperClient::from_env());

    let pipeline = SearchPipeline::new(
        Arc::clone(&documents) as Arc<dyn trawl_core::traits::DenseRetriever>,
        sparse,
        web,
        Box::new(|| {
            let scorer = HttpRelevanceScorer::from_env()?;
            Ok(Arc::new(scorer) as Arc<dyn RelevanceScorer>)
        }),
    );

    Ok((Arc::new(pipeline), documents))
}
