//! Per-document mutual exclusion.
//!
//! The record store applies last-write-wins semantics, so two requests
//! racing on the same document would interleave their writes. Each
//! orchestrator call holds the document's lock for its full duration; the
//! status compare-and-swap on the record store backs this up across
//! processes the in-memory registry cannot see.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-document async locks.
///
/// Entries are retained for the process lifetime; the registry grows with
/// the number of distinct documents touched, which is bounded by the
/// record store's working set.
#[derive(Default)]
pub struct DocumentLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl DocumentLocks {
    /// Create an empty lock registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `document_id`, waiting if another operation on
    /// the same document is in flight. Operations on distinct documents
    /// never contend.
    pub async fn acquire(&self, document_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.inner.lock().unwrap();
            registry
                .entry(document_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
