//! Lifecycle service hosting the ingestion and teardown orchestrators.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    access::AccessGuard,
    blob::{BlobStore, blob_key},
    lifecycle::{
        locks::DocumentLocks,
        types::{LifecycleError, ProcessOutcome, StepOutcome, TeardownOutcome, truncate_error_message},
    },
    metrics::{LifecycleMetrics, MetricsSnapshot},
    record::RecordStore,
    retrieval::{IngestJob, RetrievalApi},
};

/// Coordinates a document's lifecycle across the record store, the
/// retrieval service, and blob storage.
///
/// The service owns long-lived handles to all three backends plus the
/// per-document lock registry and metrics. Construct it once near process
/// start and share it through an `Arc`; the backends carry no per-request
/// state.
pub struct LifecycleService {
    records: Arc<dyn RecordStore>,
    retrieval: Arc<dyn RetrievalApi>,
    blobs: Arc<dyn BlobStore>,
    guard: AccessGuard,
    locks: DocumentLocks,
    metrics: Arc<LifecycleMetrics>,
}

/// Abstraction over the lifecycle operations used by the HTTP surface.
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    /// Run a document through ingestion: authorize, transition to
    /// `Processing`, invoke the retrieval service, and record the terminal
    /// outcome.
    async fn process(
        &self,
        document_id: &str,
        principal: &str,
    ) -> Result<ProcessOutcome, LifecycleError>;

    /// Cascade-delete a document: best-effort vector and blob cleanup,
    /// then the authoritative record delete.
    async fn teardown(
        &self,
        document_id: &str,
        principal: &str,
    ) -> Result<TeardownOutcome, LifecycleError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl LifecycleService {
    /// Build a new lifecycle service over the given backends.
    pub fn new(
        records: Arc<dyn RecordStore>,
        retrieval: Arc<dyn RetrievalApi>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            guard: AccessGuard::new(Arc::clone(&records)),
            records,
            retrieval,
            blobs,
            locks: DocumentLocks::new(),
            metrics: Arc::new(LifecycleMetrics::new()),
        }
    }

    /// Drive one document through the processing state machine.
    ///
    /// Holds the document's lock for the duration so a concurrent process
    /// or teardown on the same id waits. The `Processing` write lands
    /// before the ingest call begins, so a concurrent status read never
    /// sees a stale terminal state while work is underway. Failures from
    /// the retrieval service are persisted on the record and then
    /// re-surfaced to the caller.
    pub async fn process(
        &self,
        document_id: &str,
        principal: &str,
    ) -> Result<ProcessOutcome, LifecycleError> {
        let _lock = self.locks.acquire(document_id).await;

        let document = self
            .guard
            .authorize(document_id, principal)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        // Fail fast: no external call is made if this write does not land.
        self.records
            .mark_processing(document_id, document.status)
            .await?;
        tracing::info!(document = document_id, scope = %document.owner_scope, "Processing document");

        let job = IngestJob {
            document_id: document.id.clone(),
            owner_scope: document.owner_scope.clone(),
            location_ref: document.location_ref.clone(),
            name: document.name.clone(),
            media_kind: document.media_kind.clone(),
        };

        match self.retrieval.ingest(&job).await {
            Ok(vector_refs) => {
                if let Err(err) = self.records.mark_completed(document_id, &vector_refs).await {
                    // The index now holds vectors the record does not
                    // reference. Logged for a reconciliation sweep; the
                    // record stays in Processing.
                    tracing::error!(
                        document = document_id,
                        orphaned_vectors = ?vector_refs,
                        error = %err,
                        "Completion write failed after successful ingest"
                    );
                    return Err(err.into());
                }
                self.metrics.record_ingestion_completed();
                tracing::info!(
                    document = document_id,
                    vectors = vector_refs.len(),
                    "Document ingestion completed"
                );
                Ok(ProcessOutcome {
                    vector_count: vector_refs.len(),
                })
            }
            Err(err) => {
                let message = truncate_error_message(&err.to_string());
                if let Err(write_err) = self.records.mark_failed(document_id, &message).await {
                    tracing::error!(
                        document = document_id,
                        error = %write_err,
                        "Failed to record ingestion failure"
                    );
                }
                self.metrics.record_ingestion_failed();
                tracing::warn!(document = document_id, error = %err, "Document ingestion failed");
                Err(LifecycleError::Ingest(err))
            }
        }
    }

    /// Cascade-delete a document across all three backends.
    ///
    /// External, harder-to-recover resources go first: a crash between
    /// steps leaves the system of record intact and the teardown safely
    /// retryable. Vector and blob cleanup are best-effort; only the record
    /// delete can fail the operation.
    pub async fn teardown(
        &self,
        document_id: &str,
        principal: &str,
    ) -> Result<TeardownOutcome, LifecycleError> {
        let _lock = self.locks.acquire(document_id).await;

        let document = self
            .guard
            .authorize(document_id, principal)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        let vectors = if document.vector_refs.is_empty() {
            StepOutcome::Skipped
        } else {
            match self
                .retrieval
                .delete_vectors(&document.vector_refs, &document.owner_scope)
                .await
            {
                Ok(()) => StepOutcome::Done,
                Err(err) => {
                    // A dangling vector is recoverable by a sweep; an
                    // undeletable document is not.
                    tracing::warn!(
                        document = document_id,
                        vectors = document.vector_refs.len(),
                        error = %err,
                        "Vector cleanup failed; continuing teardown"
                    );
                    StepOutcome::Failed(err.to_string())
                }
            }
        };

        let blob = match blob_key(&document.location_ref) {
            None => {
                tracing::warn!(
                    document = document_id,
                    location = %document.location_ref,
                    "No blob key derivable; skipping blob cleanup"
                );
                StepOutcome::Skipped
            }
            Some(key) => match self.blobs.delete(&key).await {
                Ok(()) => StepOutcome::Done,
                Err(err) => {
                    tracing::warn!(
                        document = document_id,
                        key,
                        error = %err,
                        "Blob cleanup failed; continuing teardown"
                    );
                    StepOutcome::Failed(err.to_string())
                }
            },
        };

        self.records.delete(document_id).await?;

        let outcome = TeardownOutcome { vectors, blob };
        self.metrics.record_teardown(outcome.soft_failure_count());
        tracing::info!(
            document = document_id,
            vectors = ?outcome.vectors,
            blob = ?outcome.blob,
            "Document torn down"
        );
        Ok(outcome)
    }

    /// Return the current lifecycle metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl LifecycleApi for LifecycleService {
    async fn process(
        &self,
        document_id: &str,
        principal: &str,
    ) -> Result<ProcessOutcome, LifecycleError> {
        LifecycleService::process(self, document_id, principal).await
    }

    async fn teardown(
        &self,
        document_id: &str,
        principal: &str,
    ) -> Result<TeardownOutcome, LifecycleError> {
        LifecycleService::teardown(self, document_id, principal).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        LifecycleService::metrics_snapshot(self)
    }
}
