//! Error taxonomy and outcome types for the lifecycle orchestrators.

use crate::record::RecordError;
use crate::retrieval::RetrievalError;
use thiserror::Error;

/// Longest error detail persisted on a failed document record. Backend
/// errors can embed entire response bodies; the record only needs enough
/// to be actionable.
const ERROR_MESSAGE_CAP: usize = 500;

/// Hard failures surfaced by the lifecycle orchestrators.
///
/// Soft failures (vector or blob cleanup during teardown) never appear
/// here; they are captured as [`StepOutcome::Failed`] and logged.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Document absent or inaccessible to the acting principal. The two
    /// cases are indistinguishable by design.
    #[error("document not found")]
    NotFound,
    /// The system of record failed during a non-isolated step.
    #[error("record store failure: {0}")]
    Record(#[from] RecordError),
    /// The retrieval service failed during ingestion. This path is hard;
    /// the same error during teardown is swallowed instead.
    #[error("ingestion failed: {0}")]
    Ingest(#[from] RetrievalError),
}

/// Result of a successful `process` call.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOutcome {
    /// Number of vector references issued by the retrieval service.
    pub vector_count: usize,
}

/// Outcome of one best-effort teardown step.
///
/// Control flow through teardown is a straight-line sequence of wrapped
/// steps; a failure here is recorded, logged, and walked past.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran and the resource is gone.
    Done,
    /// The step had nothing to do (no vectors issued, no derivable key).
    Skipped,
    /// The step failed; teardown continued anyway.
    Failed(String),
}

impl StepOutcome {
    /// Whether this step failed and was swallowed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Result of a successful `teardown` call.
///
/// The record itself is always gone by the time this exists; the two
/// fields report how the best-effort cleanup steps fared. They are folded
/// into logs and metrics only, never persisted.
#[derive(Debug, Clone)]
pub struct TeardownOutcome {
    /// Outcome of the vector index cleanup.
    pub vectors: StepOutcome,
    /// Outcome of the blob storage cleanup.
    pub blob: StepOutcome,
}

impl TeardownOutcome {
    /// Number of soft steps that failed during this teardown.
    pub fn soft_failure_count(&self) -> u64 {
        u64::from(self.vectors.is_failed()) + u64::from(self.blob.is_failed())
    }
}

/// Bound an error message before persisting it on the document record.
pub(crate) fn truncate_error_message(message: &str) -> String {
    if message.chars().count() <= ERROR_MESSAGE_CAP {
        return message.to_string();
    }
    message.chars().take(ERROR_MESSAGE_CAP).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_pass_through_unchanged() {
        assert_eq!(truncate_error_message("rate limited"), "rate limited");
    }

    #[test]
    fn long_messages_are_capped() {
        let long = "x".repeat(2_000);
        let stored = truncate_error_message(&long);
        assert_eq!(stored.chars().count(), ERROR_MESSAGE_CAP);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(600);
        let stored = truncate_error_message(&long);
        assert_eq!(stored.chars().count(), ERROR_MESSAGE_CAP);
        assert!(stored.chars().all(|c| c == 'é'));
    }

    #[test]
    fn soft_failure_count_reflects_step_outcomes() {
        let outcome = TeardownOutcome {
            vectors: StepOutcome::Failed("connection refused".into()),
            blob: StepOutcome::Skipped,
        };
        assert_eq!(outcome.soft_failure_count(), 1);

        let clean = TeardownOutcome {
            vectors: StepOutcome::Done,
            blob: StepOutcome::Done,
        };
        assert_eq!(clean.soft_failure_count(), 0);
    }
}
