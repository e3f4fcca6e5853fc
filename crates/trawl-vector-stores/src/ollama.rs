//! Ollama embedding client.
//!
//! Chroma expects embeddings to be computed client-side, so the dense
//! retriever embeds queries and documents through a local Ollama server.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use trawl_core::error::{TrawlError, TrawlResult};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "nomic-embed-text";

/// HTTP client for the Ollama `/api/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaEmbeddings {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddings {
    pub fn new(base_url: Option<String>, model: Option<String>) -> TrawlResult<Self> {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)
            .map_err(|e| TrawlError::Configuration(format!("Invalid Ollama URL: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> TrawlResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "prompt": text,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrawlError::embedding(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(TrawlError::embedding(format!(
                "Ollama embedding error: {}",
                error
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| TrawlError::embedding(format!("Failed to parse response: {}", e)))?;

        if parsed.embedding.is_empty() {
            return Err(TrawlError::embedding(format!(
                "Model {} returned an empty embedding",
                self.model
            )));
        }
        Ok(parsed.embedding)
    }

    /// Embed a batch of texts sequentially.
    pub async fn embed_batch(&self, texts: &[String]) -> TrawlResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
