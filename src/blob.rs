//! Blob store adapter.
//!
//! The only operation the lifecycle needs from object storage is
//! delete-by-key. The adapter speaks to an S3-compatible HTTP gateway;
//! deleting a key that is already gone is treated as success so teardown
//! retries stay idempotent.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use thiserror::Error;

/// Errors returned while interacting with the blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid blob store URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Blob store responded with an unexpected status code.
    #[error("Unexpected blob store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the blob store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Delete-by-key access to object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Remove the object stored under `key`. Absent keys count as success.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}

/// Blob store adapter backed by an S3-compatible HTTP gateway.
pub struct HttpBlobStore {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) bucket: String,
    pub(crate) api_key: Option<String>,
}

impl HttpBlobStore {
    /// Construct a new adapter using configuration derived from the environment.
    pub fn new() -> Result<Self, BlobError> {
        let config = get_config();
        let client = Client::builder().user_agent("docsteward/0.1").build()?;

        let mut parsed =
            reqwest::Url::parse(&config.blob_store_url).map_err(|err| BlobError::InvalidUrl(err.to_string()))?;
        let path = parsed.path().trim_end_matches('/').to_string();
        parsed.set_path(&path);

        tracing::debug!(
            url = %parsed,
            bucket = %config.blob_bucket,
            "Initialized blob store adapter"
        );

        Ok(Self {
            client,
            base_url: parsed.to_string(),
            bucket: config.blob_bucket.clone(),
            api_key: config.blob_store_api_key.clone(),
        })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/{}/{}", self.bucket, key.trim_start_matches('/'));

        let mut req = self.client.request(Method::DELETE, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("api-key", api_key);
        }

        let response = req.send().await?;
        match response.status() {
            status if status.is_success() => {
                tracing::debug!(key, "Blob deleted");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                tracing::debug!(key, "Blob already absent");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = BlobError::UnexpectedStatus { status, body };
                tracing::error!(key, error = %error, "Blob delete failed");
                Err(error)
            }
        }
    }
}

/// Derive the storage key for a document from its location reference.
///
/// The upload flow writes objects under `uploads/` named by the last path
/// segment of the location URL; teardown reverses that mapping. Returns
/// `None` when the reference has no usable final segment.
pub fn blob_key(location_ref: &str) -> Option<String> {
    let trimmed = location_ref.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next()?;
    // A bare scheme ("https:") means the reference carried no path at all.
    if segment.is_empty() || segment.ends_with(':') {
        return None;
    }
    Some(format!("uploads/{segment}"))
}
