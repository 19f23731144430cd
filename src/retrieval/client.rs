//! HTTP client wrapper for the retrieval service.

use crate::config::get_config;
use crate::retrieval::types::{
    DeleteVectorsRequest, IngestJob, ProcessDocumentRequest, ProcessDocumentResponse,
    RetrievalApi, RetrievalError,
};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};

/// Lightweight HTTP client for retrieval service operations.
///
/// Constructed once at process start and shared across requests; the
/// underlying `reqwest::Client` pools connections internally.
pub struct RetrievalClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

impl RetrievalClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, RetrievalError> {
        let config = get_config();
        let client = Client::builder().user_agent("docsteward/0.1").build()?;

        let base_url = normalize_base_url(&config.retrieval_service_url)
            .map_err(RetrievalError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = %config
                .retrieval_service_api_key
                .as_deref()
                .map(|value| !value.is_empty())
                .unwrap_or(false),
            "Initialized retrieval service client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.retrieval_service_api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.bearer_auth(api_key);
        }
        req
    }
}

#[async_trait]
impl RetrievalApi for RetrievalClient {
    async fn ingest(&self, job: &IngestJob) -> Result<Vec<String>, RetrievalError> {
        let body = ProcessDocumentRequest {
            document_id: &job.document_id,
            workspace_id: &job.owner_scope,
            file_url: &job.location_ref,
            file_name: &job.name,
            file_type: &job.media_kind,
        };

        let response = self
            .request(Method::POST, "process-document")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = RetrievalError::UnexpectedStatus { status, body };
            tracing::error!(document = %job.document_id, error = %error, "Ingest request failed");
            return Err(error);
        }

        let payload: ProcessDocumentResponse = response.json().await?;
        if !payload.success {
            let detail = payload
                .error
                .unwrap_or_else(|| "retrieval service reported failure".to_string());
            tracing::error!(document = %job.document_id, error = %detail, "Ingest rejected");
            return Err(RetrievalError::Rejected(detail));
        }

        tracing::debug!(
            document = %job.document_id,
            vectors = payload.vector_ids.len(),
            "Document ingested"
        );
        Ok(payload.vector_ids)
    }

    async fn delete_vectors(
        &self,
        vector_refs: &[String],
        owner_scope: &str,
    ) -> Result<(), RetrievalError> {
        let body = DeleteVectorsRequest {
            vector_ids: vector_refs,
            workspace_id: owner_scope,
        };

        let response = self
            .request(Method::POST, "delete-vectors")
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!(vectors = vector_refs.len(), "Vectors deleted");
                Ok(())
            }
            // Already-absent vectors are a success for teardown retries.
            StatusCode::NOT_FOUND => {
                tracing::debug!(vectors = vector_refs.len(), "Vectors already absent");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = RetrievalError::UnexpectedStatus { status, body };
                tracing::error!(error = %error, "Vector delete failed");
                Err(error)
            }
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
