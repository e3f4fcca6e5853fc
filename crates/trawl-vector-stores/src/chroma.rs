//! Chroma dense retrieval backend.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

use trawl_core::error::{TrawlError, TrawlResult};
use trawl_core::traits::DenseRetriever;
use trawl_core::types::{normalize_metadata, Document, Metadata};

use crate::ollama::OllamaEmbeddings;

/// Connection settings for a Chroma server.
#[derive(Debug, Clone)]
pub struct ChromaConfig {
    pub base_url: String,
    pub tenant: String,
    pub database: String,
    pub collection: String,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            collection: "documents".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChromaCollection {
    id: String,
}

/// Dense retriever backed by a Chroma collection, with embeddings computed
/// through Ollama.
pub struct ChromaDenseRetriever {
    client: Client,
    config: ChromaConfig,
    embedder: OllamaEmbeddings,
    // Resolved once; Chroma addresses collections by id, not name.
    collection_id: OnceCell<String>,
}

impl ChromaDenseRetriever {
    pub fn new(config: ChromaConfig, embedder: OllamaEmbeddings) -> Self {
        Self {
            client: Client::new(),
            config,
            embedder,
            collection_id: OnceCell::new(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.config.base_url, path)
    }

    async fn collection_id(&self) -> TrawlResult<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| self.get_or_create_collection())
            .await?;
        Ok(id.as_str())
    }

    async fn get_or_create_collection(&self) -> TrawlResult<String> {
        let url = self.api_url(&format!(
            "/tenants/{}/databases/{}/collections",
            self.config.tenant, self.config.database
        ));

        let body = json!({
            "name": self.config.collection,
            "get_or_create": true,
            "metadata": { "hnsw:space": "cosine" }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrawlError::vector_store(format!("Failed to create collection: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(TrawlError::vector_store(format!(
                "Failed to create collection: {}",
                error
            )));
        }

        let collection: ChromaCollection = response
            .json()
            .await
            .map_err(|e| TrawlError::vector_store(format!("Failed to parse response: {}", e)))?;

        debug!(collection = %self.config.collection, id = %collection.id, "Resolved Chroma collection");
        Ok(collection.id)
    }

    /// Embed and upsert documents, returning the generated ids.
    pub async fn add_documents(&self, documents: &[Document]) -> TrawlResult<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let collection_id = self.collection_id().await?;

        let contents: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&contents).await?;
        let ids: Vec<String> = documents.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let metadatas: Vec<serde_json::Value> = documents
            .iter()
            .map(|d| serde_json::to_value(&d.metadata))
            .collect::<Result<_, _>>()?;

        let url = self.api_url(&format!("/collections/{}/upsert", collection_id));
        let body = json!({
            "ids": ids,
            "embeddings": embeddings,
            "documents": contents,
            "metadatas": metadatas
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrawlError::vector_store(format!("Failed to upsert: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(TrawlError::vector_store(format!(
                "Failed to upsert: {}",
                error
            )));
        }
        Ok(ids)
    }

    /// Remove one document by id. Deleting an unknown id is not an error.
    pub async fn delete_document(&self, id: &str) -> TrawlResult<()> {
        let collection_id = self.collection_id().await?;
        let url = self.api_url(&format!("/collections/{}/delete", collection_id));
        let body = json!({ "ids": [id] });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrawlError::vector_store(format!("Failed to delete: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(TrawlError::vector_store(format!(
                "Failed to delete: {}",
                error
            )));
        }
        Ok(())
    }

    pub async fn count(&self) -> TrawlResult<usize> {
        let collection_id = self.collection_id().await?;
        let url = self.api_url(&format!("/collections/{}/count", collection_id));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TrawlError::vector_store(format!("Failed to count: {}", e)))?;

        let count: usize = response
            .json()
            .await
            .map_err(|e| TrawlError::vector_store(format!("Failed to parse response: {}", e)))?;
        Ok(count)
    }

    fn build_filter(filter: &Metadata) -> serde_json::Value {
        let clauses: serde_json::Map<String, serde_json::Value> = filter
            .iter()
            .filter_map(|(k, v)| {
                serde_json::to_value(v)
                    .ok()
                    .map(|value| (k.clone(), json!({ "$eq": value })))
            })
            .collect();
        serde_json::Value::Object(clauses)
    }
}

#[async_trait]
impl DenseRetriever for ChromaDenseRetriever {
    async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&Metadata>,
    ) -> TrawlResult<Vec<Document>> {
        let collection_id = self.collection_id().await?;
        let query_embedding = self.embedder.embed(query).await?;

        let url = self.api_url(&format!("/collections/{}/query", collection_id));
        let mut body = json!({
            "query_embeddings": [query_embedding],
            "n_results": k,
            "include": ["documents", "metadatas"]
        });
        if let Some(f) = filter {
            if !f.is_empty() {
                body["where"] = Self::build_filter(f);
            }
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrawlError::vector_store(format!("Failed to query: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(TrawlError::vector_store(format!(
                "Failed to query: {}",
                error
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TrawlError::vector_store(format!("Failed to parse response: {}", e)))?;

        let documents = result["documents"][0].as_array().cloned().unwrap_or_default();
        let metadatas = result["metadatas"][0].as_array().cloned().unwrap_or_default();

        let hits = documents
            .into_iter()
            .zip(metadatas.into_iter())
            .map(|(content, metadata)| {
                let content = content.as_str().unwrap_or_default().to_string();
                let raw: HashMap<String, serde_json::Value> = metadata
                    .as_object()
                    .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                    .unwrap_or_default();
                Document::new(content, normalize_metadata(raw))
            })
            .collect();
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trawl_core::types::ScalarValue;

    #[test]
    fn test_build_filter_uses_eq_clauses() {
        let mut filter = Metadata::new();
        filter.insert("source".to_string(), ScalarValue::from("manual".to_string()));

        let clause = ChromaDenseRetriever::build_filter(&filter);
        assert_eq!(clause["source"]["$eq"], json!("manual"));
    }

    #[test]
    fn test_default_config() {
        let config = ChromaConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.collection, "documents");
    }
}
