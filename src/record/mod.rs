//! Document records and the record store boundary.
//!
//! The orchestrators never talk to SQL directly; they go through the
//! [`RecordStore`] trait so the system of record stays swappable and the
//! lifecycle logic stays testable with in-memory stubs.

pub mod sqlite;
pub mod types;

pub use sqlite::SqliteRecordStore;
pub use types::{Document, DocumentStatus, NewDocument, RecordError, RecordStore};
