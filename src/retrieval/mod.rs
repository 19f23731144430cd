//! Retrieval service integration.
//!
//! The retrieval service owns embedding and indexing; this module only
//! carries the two operations the orchestrators need from it: submit a
//! document for ingestion and delete previously issued vector references.

pub mod client;
pub mod types;

pub use client::RetrievalClient;
pub use types::{IngestJob, RetrievalApi, RetrievalError};
