use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing lifecycle activity.
#[derive(Default)]
pub struct LifecycleMetrics {
    ingestions_completed: AtomicU64,
    ingestions_failed: AtomicU64,
    documents_deleted: AtomicU64,
    soft_failures: AtomicU64,
}

impl LifecycleMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document that reached `Completed`.
    pub fn record_ingestion_completed(&self) {
        self.ingestions_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a document that reached `Failed`.
    pub fn record_ingestion_failed(&self) {
        self.ingestions_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed teardown, along with how many soft cleanup steps failed.
    pub fn record_teardown(&self, soft_failures: u64) {
        self.documents_deleted.fetch_add(1, Ordering::Relaxed);
        self.soft_failures.fetch_add(soft_failures, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ingestions_completed: self.ingestions_completed.load(Ordering::Relaxed),
            ingestions_failed: self.ingestions_failed.load(Ordering::Relaxed),
            documents_deleted: self.documents_deleted.load(Ordering::Relaxed),
            soft_failures: self.soft_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of lifecycle counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of ingestions that finished in `Completed` since startup.
    pub ingestions_completed: u64,
    /// Number of ingestions that finished in `Failed` since startup.
    pub ingestions_failed: u64,
    /// Number of documents fully torn down since startup.
    pub documents_deleted: u64,
    /// Number of best-effort cleanup steps that failed and were swallowed.
    pub soft_failures: u64,
}
