//! Document lifecycle orchestration.
//!
//! Two orchestrators share this module: ingestion drives the
//! pending → processing → completed/failed state machine, and teardown
//! removes a document's footprint from the vector index, blob storage, and
//! the system of record. Neither calls the other; both communicate only
//! through the record store and the two external adapters.

mod locks;
mod service;
pub mod types;

pub use locks::DocumentLocks;
pub use service::{LifecycleApi, LifecycleService};
pub use types::{LifecycleError, ProcessOutcome, StepOutcome, TeardownOutcome};
