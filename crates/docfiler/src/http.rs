//! JSON HTTP API over a [`DocumentService`].
//!
//! Routes:
//!
//! | Method | Path                          | Operation                 |
//! |--------|-------------------------------|---------------------------|
//! | GET    | `/api/documents`              | list all documents        |
//! | GET    | `/api/documents/search`       | search with query filters |
//! | GET    | `/api/documents/{id}`         | read one document         |
//! | POST   | `/api/documents`              | create                    |
//! | PUT    | `/api/documents/{id}`         | update                    |
//! | DELETE | `/api/documents/{id}`         | delete                    |
//! | GET    | `/api/dashboard/stats`        | dashboard figures         |
//! | GET    | `/api/document-types`         | registry listing          |
//! | GET    | `/api/document-types/{key}`   | one registry entry        |
//! | GET    | `/health`                     | liveness                  |
//!
//! Errors come back as `{"error": "..."}` with 404 for unknown ids, 400 for
//! rejected payloads and 500 for everything else.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::dashboard::DashboardStats;
use crate::document::{DocumentPayload, DocumentRecord};
use crate::error::Error;
use crate::registry::{self, DocumentTypeDescriptor};
use crate::search::{SearchCriteria, SearchResults};
use crate::service::DocumentService;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    service: Arc<Mutex<DocumentService>>,
}

impl AppState {
    /// Wrap a service for sharing between requests.
    #[must_use]
    pub fn new(service: DocumentService) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// An [`Error`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            Error::NotFound { .. } => "Document not found".to_string(),
            Error::Validation { .. } => self.0.to_string(),
            Error::Persistence { .. } => {
                error!("Change not saved: {}", self.0);
                format!("change applied but may not have been saved: {}", self.0)
            }
            other => {
                error!("Server error: {}", other);
                "Internal server error".to_string()
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Build the router for `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/documents", get(list_documents).post(create_document))
        .route("/api/documents/search", get(search_documents))
        .route(
            "/api/documents/{id}",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/document-types", get(list_document_types))
        .route("/api/document-types/{key}", get(get_document_type))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(service: DocumentService, addr: &str) -> std::io::Result<()> {
    let target = service.store().target();
    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Document filing server listening on http://{}", listener.local_addr()?);
    info!("Storing documents in {}", target);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutting down");
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_documents(State(state): State<AppState>) -> Json<Vec<DocumentRecord>> {
    let service = state.service.lock().await;
    Json(service.list().to_vec())
}

async fn search_documents(
    State(state): State<AppState>,
    Query(criteria): Query<SearchCriteria>,
) -> Json<SearchResults> {
    let service = state.service.lock().await;
    Json(service.search(&criteria))
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DocumentRecord>> {
    let service = state.service.lock().await;
    Ok(Json(service.read(&id)?.clone()))
}

async fn create_document(
    State(state): State<AppState>,
    Json(payload): Json<DocumentPayload>,
) -> ApiResult<(StatusCode, Json<DocumentRecord>)> {
    let mut service = state.service.lock().await;
    let record = service.create(&payload)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<DocumentPayload>,
) -> ApiResult<Json<DocumentRecord>> {
    let mut service = state.service.lock().await;
    Ok(Json(service.update(&id, &payload)?))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut service = state.service.lock().await;
    service.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dashboard_stats(State(state): State<AppState>) -> Json<DashboardStats> {
    let service = state.service.lock().await;
    Json(service.stats())
}

async fn list_document_types() -> Json<&'static [DocumentTypeDescriptor]> {
    Json(registry::all())
}

async fn get_document_type(
    Path(key): Path<String>,
) -> Result<Json<&'static DocumentTypeDescriptor>, (StatusCode, Json<ErrorBody>)> {
    registry::describe(&key).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("unknown document type: {key}"),
            }),
        )
    })
}
