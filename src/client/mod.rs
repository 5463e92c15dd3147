//! Board client.
//!
//! A headless model of the Kanban board: it keeps a last-known-good copy of
//! the server's task list, groups it into stage columns, and drives the
//! create/edit dialog and drag-and-drop transitions through a [`TaskApi`].
//!
//! Two transports are provided:
//! - [`HttpTaskApi`] talks to a running task API over HTTP.
//! - [`LocalTaskApi`] wraps an in-process store for offline use.

mod board;
mod dialog;
mod drag;
mod http;
mod local;

pub use board::{Board, Column, Reconcile};
pub use dialog::{DialogMode, DialogState, TaskForm};
pub use drag::{DragState, DropOutcome};
pub use http::HttpTaskApi;
pub use local::LocalTaskApi;

use crate::error::{ApiError, StoreError};
use crate::types::{NewTask, Task, TaskFilter, TaskPatch};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by the board client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached or returned an unreadable body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// Rejected locally, before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// HTTP status of a server-side rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            ClientError::Validation(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        let err = ApiError::from(err);
        ClientError::Api {
            status: err.status_code().as_u16(),
            message: err.message,
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Operations the board needs from the task service.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self, filter: &TaskFilter) -> ClientResult<Vec<Task>>;

    async fn create_task(&self, input: &NewTask) -> ClientResult<Task>;

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> ClientResult<Task>;

    /// Returns the removed task.
    async fn delete_task(&self, id: &str) -> ClientResult<Task>;

    /// Stage names in display order.
    async fn list_statuses(&self) -> ClientResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_to_http_status() {
        let err = ClientError::from(StoreError::NotFound("abc".into()));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Task not found: abc (HTTP 404)");

        let err = ClientError::from(StoreError::MissingField("title"));
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_validation_has_no_status() {
        let err = ClientError::Validation("Title is required".into());
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
