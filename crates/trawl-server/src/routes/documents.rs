//! Document and index administration endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use trawl_core::types::{normalize_metadata, Document};

/// Incoming document with free-form metadata; values are normalized to
/// scalars before storage.
#[derive(Debug, Deserialize)]
pub struct DocumentRecord {
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct AddDocumentsRequest {
    pub documents: Vec<DocumentRecord>,
}

#[derive(Debug, Serialize)]
pub struct AddDocumentsResponse {
    pub status: String,
    pub document_ids: Vec<String>,
    pub total_chunks: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteDocumentResponse {
    pub status: String,
    pub document_id: String,
}

#[derive(Debug, Serialize)]
pub struct RebuildIndexResponse {
    pub status: String,
    pub indexed: usize,
}

fn into_documents(records: Vec<DocumentRecord>) -> Vec<Document> {
    records
        .into_iter()
        .map(|r| Document::new(r.content, normalize_metadata(r.metadata)))
        .collect()
}

/// Ingest pre-chunked documents into both retrieval branches.
/// POST /documents
pub async fn add_documents(
    State(state): State<AppState>,
    Json(request): Json<AddDocumentsRequest>,
) -> ApiResult<Json<AddDocumentsResponse>> {
    if request.documents.is_empty() {
        return Err(ApiError::bad_request("No documents provided"));
    }

    let documents = into_documents(request.documents);

    let ids = state
        .documents
        .add_documents(&documents)
        .await
        .map_err(ApiError::from)?;

    let sparse = state.pipeline.sparse_index();
    sparse.add(&documents);
    if let Err(e) = sparse.persist() {
        tracing::warn!(error = %e, "Failed to persist sparse index after ingest");
    }

    Ok(Json(AddDocumentsResponse {
        status: "success".to_string(),
        total_chunks: ids.len(),
        document_ids: ids,
    }))
}

/// Remove a document from the vector store.
/// DELETE /documents/:doc_id
pub async fn remove_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> ApiResult<Json<DeleteDocumentResponse>> {
    state
        .documents
        .delete_document(&doc_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(DeleteDocumentResponse {
        status: "deleted".to_string(),
        document_id: doc_id,
    }))
}

/// Rebuild the sparse index from scratch over the supplied corpus.
/// POST /index/rebuild
pub async fn rebuild_index(
    State(state): State<AppState>,
    Json(request): Json<AddDocumentsRequest>,
) -> ApiResult<Json<RebuildIndexResponse>> {
    let documents = into_documents(request.documents);
    state.pipeline.sparse_index().rebuild(&documents);

    Ok(Json(RebuildIndexResponse {
        status: "rebuilt".to_string(),
        indexed: documents.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trawl_core::types::ScalarValue;

    #[test]
    fn test_metadata_normalized_on_ingest() {
        let request: AddDocumentsRequest = serde_json::from_str(
            r#"{"documents": [{"content": "text", "metadata": {"page": 3, "tags": ["a", "b"]}}]}"#,
        )
        .unwrap();

        let docs = into_documents(request.documents);
        assert_eq!(docs[0].metadata["page"], ScalarValue::Number(3.0));
        // Rich values collapse to their JSON rendering.
        assert_eq!(
            docs[0].metadata["tags"],
            ScalarValue::String("[\"a\",\"b\"]".to_string())
        );
    }

    #[test]
    fn test_metadata_defaults_to_empty() {
        let request: AddDocumentsRequest =
            serde_json::from_str(r#"{"documents": [{"content": "text"}]}"#).unwrap();
        let docs = into_documents(request.documents);
        assert!(docs[0].metadata.is_empty());
    }
}
