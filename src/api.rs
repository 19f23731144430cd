//! HTTP surface for the document steward.
//!
//! This module exposes a compact Axum router with three endpoints:
//!
//! - `POST /documents/{id}/process` – Run a document through ingestion and
//!   record the terminal outcome. Returns `{"success":true}` on completion.
//! - `DELETE /documents/{id}` – Cascade-delete a document from the vector
//!   index, blob storage, and the system of record.
//! - `GET /metrics` – Observe lifecycle counters.
//!
//! The acting principal arrives in the `x-principal-id` header. Error
//! bodies are deliberately generic: backend detail never leaves the
//! process, and "absent" is indistinguishable from "not owned".

use crate::lifecycle::{LifecycleApi, LifecycleError};
use crate::metrics::MetricsSnapshot;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Serialize;
use std::sync::Arc;

/// Build the HTTP router exposing the document lifecycle surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: LifecycleApi + 'static,
{
    Router::new()
        .route("/documents/:id/process", post(process_document::<S>))
        .route("/documents/:id", delete(teardown_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Success response shared by both lifecycle endpoints.
#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

/// Submit a document for ingestion.
async fn process_document<S>(
    State(service): State<Arc<S>>,
    Path(document_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError>
where
    S: LifecycleApi,
{
    let principal = principal_from(&headers)?;
    let outcome = service.process(&document_id, &principal).await?;
    tracing::info!(
        document = %document_id,
        vectors = outcome.vector_count,
        "Process request completed"
    );
    Ok(Json(SuccessResponse { success: true }))
}

/// Cascade-delete a document.
async fn teardown_document<S>(
    State(service): State<Arc<S>>,
    Path(document_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError>
where
    S: LifecycleApi,
{
    let principal = principal_from(&headers)?;
    let outcome = service.teardown(&document_id, &principal).await?;
    tracing::info!(
        document = %document_id,
        soft_failures = outcome.soft_failure_count(),
        "Delete request completed"
    );
    Ok(Json(SuccessResponse { success: true }))
}

/// Return the current lifecycle counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: LifecycleApi,
{
    Json(service.metrics_snapshot())
}

/// Resolve the acting principal from request headers.
///
/// Identity verification itself happens upstream; by the time a request
/// reaches this service the header carries a resolved principal id. A
/// missing or empty header means no valid principal.
fn principal_from(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("x-principal-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(AppError::Unauthorized)
}

enum AppError {
    Unauthorized,
    NotFound,
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "Document not found").into_response(),
            Self::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error").into_response()
            }
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(inner: LifecycleError) -> Self {
        match inner {
            LifecycleError::NotFound => Self::NotFound,
            // Hard dependency failures surface as an opaque 500; the
            // backend-specific detail stays in the logs.
            LifecycleError::Record(_) | LifecycleError::Ingest(_) => Self::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::lifecycle::{
        LifecycleApi, LifecycleError, ProcessOutcome, StepOutcome, TeardownOutcome,
    };
    use crate::metrics::MetricsSnapshot;
    use crate::record::RecordError;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Process(String, String),
        Teardown(String, String),
    }

    enum StubBehavior {
        Succeed,
        NotFound,
        RecordFailure,
    }

    struct StubLifecycleService {
        behavior: StubBehavior,
        calls: Mutex<Vec<Call>>,
    }

    impl StubLifecycleService {
        fn new(behavior: StubBehavior) -> Self {
            Self {
                behavior,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn recorded_calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn fail(&self) -> Option<LifecycleError> {
            match self.behavior {
                StubBehavior::Succeed => None,
                StubBehavior::NotFound => Some(LifecycleError::NotFound),
                StubBehavior::RecordFailure => Some(LifecycleError::Record(
                    RecordError::Storage("connection reset by peer".into()),
                )),
            }
        }
    }

    #[async_trait]
    impl LifecycleApi for StubLifecycleService {
        async fn process(
            &self,
            document_id: &str,
            principal: &str,
        ) -> Result<ProcessOutcome, LifecycleError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Process(document_id.into(), principal.into()));
            match self.fail() {
                Some(err) => Err(err),
                None => Ok(ProcessOutcome { vector_count: 2 }),
            }
        }

        async fn teardown(
            &self,
            document_id: &str,
            principal: &str,
        ) -> Result<TeardownOutcome, LifecycleError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Teardown(document_id.into(), principal.into()));
            match self.fail() {
                Some(err) => Err(err),
                None => Ok(TeardownOutcome {
                    vectors: StepOutcome::Done,
                    blob: StepOutcome::Done,
                }),
            }
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                ingestions_completed: 3,
                ingestions_failed: 1,
                documents_deleted: 2,
                soft_failures: 0,
            }
        }
    }

    fn request(method: Method, uri: &str, principal: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(principal) = principal {
            builder = builder.header("x-principal-id", principal);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn process_route_returns_success_body() {
        let service = Arc::new(StubLifecycleService::new(StubBehavior::Succeed));
        let app = create_router(service.clone());

        let response = app
            .oneshot(request(Method::POST, "/documents/d1/process", Some("u1")))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["success"], true);

        assert_eq!(
            service.recorded_calls(),
            vec![Call::Process("d1".into(), "u1".into())]
        );
    }

    #[tokio::test]
    async fn missing_principal_is_unauthorized_with_no_call() {
        let service = Arc::new(StubLifecycleService::new(StubBehavior::Succeed));
        let app = create_router(service.clone());

        let response = app
            .oneshot(request(Method::DELETE, "/documents/d1", None))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert_eq!(String::from_utf8_lossy(&body), "Unauthorized");
        assert!(service.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn blank_principal_is_unauthorized() {
        let service = Arc::new(StubLifecycleService::new(StubBehavior::Succeed));
        let app = create_router(service.clone());

        let response = app
            .oneshot(request(Method::POST, "/documents/d1/process", Some("   ")))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(service.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn not_found_maps_to_404_with_generic_body() {
        let service = Arc::new(StubLifecycleService::new(StubBehavior::NotFound));
        let app = create_router(service);

        let response = app
            .oneshot(request(Method::DELETE, "/documents/d9", Some("u1")))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert_eq!(String::from_utf8_lossy(&body), "Document not found");
    }

    #[tokio::test]
    async fn hard_failures_map_to_500_without_backend_detail() {
        let service = Arc::new(StubLifecycleService::new(StubBehavior::RecordFailure));
        let app = create_router(service);

        let response = app
            .oneshot(request(Method::POST, "/documents/d1/process", Some("u1")))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let text = String::from_utf8_lossy(&body);
        assert_eq!(text, "Internal Error");
        assert!(!text.contains("connection reset"));
    }

    #[tokio::test]
    async fn metrics_route_reports_counters() {
        let service = Arc::new(StubLifecycleService::new(StubBehavior::Succeed));
        let app = create_router(service);

        let response = app
            .oneshot(request(Method::GET, "/metrics", None))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["ingestions_completed"], 3);
        assert_eq!(json["documents_deleted"], 2);
    }
}
