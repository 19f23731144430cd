//! Access guard for document operations.
//!
//! Both orchestrators call [`AccessGuard::authorize`] before touching any
//! backend. Absence and inaccessibility are deliberately indistinguishable
//! so unauthorized callers learn nothing about which documents exist.

use std::sync::Arc;

use crate::record::{Document, RecordError, RecordStore};

/// Resolves whether an acting principal may operate on a document.
///
/// Pure read over the record store; safe to call repeatedly and performs
/// no mutation. The ownership constraint is applied inside the same record
/// store query as the lookup, so there is no window between the check and
/// the fetch.
pub struct AccessGuard {
    store: Arc<dyn RecordStore>,
}

impl AccessGuard {
    /// Build a guard over the given record store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Return the document only if `principal` is a member of its owning
    /// scope; `Ok(None)` otherwise, whether or not the document exists.
    pub async fn authorize(
        &self,
        document_id: &str,
        principal: &str,
    ) -> Result<Option<Document>, RecordError> {
        let resolved = self.store.find_owned(document_id, principal).await?;
        if resolved.is_none() {
            tracing::debug!(document = document_id, "Document absent or not owned by principal");
        }
        Ok(resolved)
    }
}
