//! HTTP server implementation for the task API.
//!
//! This module provides the axum router, the request handlers, and the
//! server lifecycle handle.

use axum::{
    Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use std::any::Any;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::store::TaskStore;
use crate::types::{DeleteResponse, NewTask, Status, Task, TaskFilter, TaskPatch};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct ApiServer {
    store: TaskStore,
}

impl ApiServer {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Unwrap a JSON body, turning decode failures into 400s.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "Rejected request body");
            Err(ApiError::invalid_body(rejection.body_text()))
        }
    }
}

/// Log a rejected write and pass the error through.
fn rejected(err: impl Into<ApiError>) -> ApiError {
    let err = err.into();
    warn!(code = ?err.code, field = ?err.field, "{}", err.message);
    err
}

/// `GET /tasks` with optional `status` and `assignee` filters.
async fn list_tasks(
    State(state): State<ApiServer>,
    query: Result<Query<TaskFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(filter) = query.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Rejected query string");
        ApiError::invalid_query(rejection.body_text())
    })?;
    Ok(Json(state.store().list(&filter.normalized())))
}

/// `GET /tasks/{id}`.
async fn get_task(
    State(state): State<ApiServer>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    debug!(task_id = %task_id, "Fetching task");
    let task = state.store().get(&task_id)?;
    Ok(Json(task))
}

/// `POST /tasks`.
async fn create_task(
    State(state): State<ApiServer>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let input = json_body(payload)?;
    let task = state.store().create(input).map_err(rejected)?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /tasks/{id}` with any subset of the mutable fields.
async fn update_task(
    State(state): State<ApiServer>,
    Path(task_id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let patch = json_body(payload)?;
    let task = state.store().update(&task_id, patch).map_err(rejected)?;
    Ok(Json(task))
}

/// `DELETE /tasks/{id}`.
async fn delete_task(
    State(state): State<ApiServer>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let task = state.store().delete(&task_id).map_err(rejected)?;
    Ok(Json(DeleteResponse {
        message: "Task deleted".to_string(),
        deleted_task: task,
    }))
}

/// `GET /api/statuses` - stage names in display order.
async fn list_statuses() -> Json<Vec<&'static str>> {
    Json(Status::names())
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// API root - returns available endpoints.
async fn api_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "tasks": "/tasks",
            "task": "/tasks/{id}",
            "statuses": "/api/statuses",
            "health": "/api/health",
        }
    }))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::route_not_found(uri.path())
}

/// Convert a handler panic into a generic 500 without leaking details.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(%detail, "Request handler panicked");
    ApiError::internal().into_response()
}

/// Build the router with all routes.
pub fn build_router(store: TaskStore) -> Router {
    // Browser front-ends may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api", get(api_root))
        .route("/api/statuses", get(list_statuses))
        .route("/api/health", get(health))
        .fallback(not_found)
        // Add middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ApiServer::new(store))
}

/// Handle for a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for clients, e.g. `http://127.0.0.1:3000`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Signal graceful shutdown and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            error!("Server task failed: {}", e);
        }
    }
}

/// Bind `addr` and serve the API in a background task.
///
/// Port 0 binds an ephemeral port; the actual address is on the handle.
pub async fn start_server(store: TaskStore, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
    let app = build_router(store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Task API listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Task API shutting down");
            })
            .await
        {
            error!("Task API server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr: bound_addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn test_handle_panic_hides_detail() {
        let response = handle_panic(Box::new("secret internals".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_start_server_binds_ephemeral_port() {
        let handle = start_server(TaskStore::new(), SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        assert_ne!(handle.addr().port(), 0);
        assert!(handle.url().starts_with("http://127.0.0.1:"));
        handle.shutdown().await;
    }
}
