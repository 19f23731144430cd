//! Shared types for the retrieval service client.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while interacting with the retrieval service.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid retrieval service URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Retrieval service responded with an unexpected status code.
    #[error("Unexpected retrieval service response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the retrieval service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Retrieval service accepted the request but reported a processing failure.
    #[error("{0}")]
    Rejected(String),
}

/// Everything the retrieval service needs to ingest one document.
#[derive(Debug, Clone)]
pub struct IngestJob {
    /// Identifier of the document being ingested.
    pub document_id: String,
    /// Owner scope used to partition the vector index.
    pub owner_scope: String,
    /// Location of the document bytes for the service to fetch.
    pub location_ref: String,
    /// Human-facing file name, stored with each chunk for traceability.
    pub name: String,
    /// Content-type classifier selecting the ingestion path.
    pub media_kind: String,
}

/// Operations the orchestrators require from the retrieval backend.
#[async_trait]
pub trait RetrievalApi: Send + Sync {
    /// Submit a document for embedding and indexing, returning the vector
    /// references issued for it. The call blocks until the service reports
    /// an outcome; its own timeout and retry policy govern the wait.
    async fn ingest(&self, job: &IngestJob) -> Result<Vec<String>, RetrievalError>;

    /// Remove previously issued vector references from the index. Absent
    /// vectors count as success so that a retried teardown is a no-op.
    async fn delete_vectors(
        &self,
        vector_refs: &[String],
        owner_scope: &str,
    ) -> Result<(), RetrievalError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProcessDocumentRequest<'a> {
    pub(crate) document_id: &'a str,
    pub(crate) workspace_id: &'a str,
    pub(crate) file_url: &'a str,
    pub(crate) file_name: &'a str,
    pub(crate) file_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProcessDocumentResponse {
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) vector_ids: Vec<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteVectorsRequest<'a> {
    pub(crate) vector_ids: &'a [String],
    pub(crate) workspace_id: &'a str,
}
