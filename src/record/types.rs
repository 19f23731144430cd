//! Document model and record store contract.

use async_trait::async_trait;
use thiserror::Error;

/// Processing state of a document record.
///
/// `Failed` is re-enterable: a retry moves the document back into
/// `Processing` and clears the stored error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Uploaded but never submitted for ingestion.
    Pending,
    /// An ingestion attempt is in flight.
    Processing,
    /// The most recent ingestion succeeded; `vector_refs` is current.
    Completed,
    /// The most recent ingestion failed; `error_message` holds the detail.
    Failed,
}

impl DocumentStatus {
    /// Stable string form stored in the record store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse the stored string form back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document record as held by the system of record.
#[derive(Debug, Clone)]
pub struct Document {
    /// Opaque unique identifier, immutable.
    pub id: String,
    /// Workspace/tenant the document belongs to, immutable after creation.
    pub owner_scope: String,
    /// Human-facing file name passed through to the retrieval service.
    pub name: String,
    /// Pointer to the document bytes in blob storage.
    pub location_ref: String,
    /// Content-type classifier used to select an ingestion path.
    pub media_kind: String,
    /// Current position in the processing state machine.
    pub status: DocumentStatus,
    /// Failure detail; non-null only while `status` is `Failed`.
    pub error_message: Option<String>,
    /// Identifiers returned by the retrieval service for the last
    /// successful ingestion. May be stale if a later teardown failed
    /// partway through its best-effort steps.
    pub vector_refs: Vec<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last mutation.
    pub updated_at: String,
}

/// Fields required to create a document record.
///
/// Record creation belongs to the upload flow, which sits outside the
/// orchestrators; it exists here so that flow (and tests) have a way to
/// seed state.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Workspace/tenant that owns the document.
    pub owner_scope: String,
    /// Human-facing file name.
    pub name: String,
    /// Pointer to the document bytes in blob storage.
    pub location_ref: String,
    /// Content-type classifier.
    pub media_kind: String,
}

/// Errors surfaced by the record store.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The underlying storage engine rejected or failed the operation.
    #[error("record store operation failed: {0}")]
    Storage(String),
    /// A conditional status transition found a different status than expected.
    #[error("document status changed underneath the operation (expected {expected})")]
    StatusConflict {
        /// Status the caller observed before attempting the transition.
        expected: DocumentStatus,
    },
    /// The targeted record no longer exists.
    #[error("document record no longer exists")]
    Missing,
}

/// Access to the system of record for documents.
///
/// `find_owned` constrains the lookup by ownership in the same query, so
/// there is no window between authorization and mutation in which the
/// record could be swapped out from under the caller. Status transitions
/// are modeled as typed operations rather than a generic partial update;
/// each one also refreshes `updated_at`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a document only if `principal` is a member of its owning scope.
    ///
    /// Returns `Ok(None)` both when the document does not exist and when it
    /// exists but the principal has no access. Callers must not
    /// distinguish the two.
    async fn find_owned(
        &self,
        document_id: &str,
        principal: &str,
    ) -> Result<Option<Document>, RecordError>;

    /// Transition to `Processing` and clear `error_message`, conditioned on
    /// the status the caller last observed. Fails with
    /// [`RecordError::StatusConflict`] when the stored status differs.
    async fn mark_processing(
        &self,
        document_id: &str,
        expected: DocumentStatus,
    ) -> Result<(), RecordError>;

    /// Transition to `Completed`, replacing `vector_refs` wholesale and
    /// clearing `error_message`. A new ingestion supersedes any prior
    /// vector set; refs are never appended.
    async fn mark_completed(
        &self,
        document_id: &str,
        vector_refs: &[String],
    ) -> Result<(), RecordError>;

    /// Transition to `Failed`, recording the failure detail.
    async fn mark_failed(
        &self,
        document_id: &str,
        error_message: &str,
    ) -> Result<(), RecordError>;

    /// Remove the record entirely. Deleting a record that is already gone
    /// fails with [`RecordError::Missing`].
    async fn delete(&self, document_id: &str) -> Result<(), RecordError>;
}
