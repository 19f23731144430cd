#![deny(missing_docs)]

//! Core library for the document steward service.

/// Access guard resolving document ownership before any mutation.
pub mod access;
/// HTTP routing and REST handlers.
pub mod api;
/// Blob store adapter for delete-by-key cleanup.
pub mod blob;
/// Environment-driven configuration management.
pub mod config;
/// Ingestion and teardown orchestrators.
pub mod lifecycle;
/// Structured logging and tracing setup.
pub mod logging;
/// Lifecycle metrics helpers.
pub mod metrics;
/// Document records and the record store boundary.
pub mod record;
/// Retrieval service client.
pub mod retrieval;
