//! In-memory task store.
//!
//! The store owns the authoritative, insertion-ordered task list. Each
//! operation holds the single lock for its whole duration, so concurrent
//! requests on a multi-threaded runtime never interleave within one call.

pub mod validate;

use crate::error::{StoreError, StoreResult};
use crate::types::{NewTask, Task, TaskFilter, TaskPatch};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// Shared handle to the task collection. Clones refer to the same tasks.
#[derive(Clone, Default)]
pub struct TaskStore {
    tasks: Arc<Mutex<Vec<Task>>>,
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a function with exclusive access to the task list.
    fn with_tasks<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut Vec<Task>) -> T,
    {
        // Writes are validated before mutation, so a poisoned list is still consistent.
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut tasks)
    }

    /// Tasks matching every provided filter, in insertion order.
    pub fn list(&self, filter: &TaskFilter) -> Vec<Task> {
        let tasks: Vec<Task> = self.with_tasks(|tasks| {
            tasks
                .iter()
                .filter(|task| filter.matches(task))
                .cloned()
                .collect()
        });
        debug!(count = tasks.len(), ?filter, "Listed tasks");
        tasks
    }

    pub fn get(&self, id: &str) -> StoreResult<Task> {
        self.with_tasks(|tasks| {
            tasks
                .iter()
                .find(|task| task.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
    }

    /// Validate `input`, assign an id and timestamps, and append the task.
    pub fn create(&self, input: NewTask) -> StoreResult<Task> {
        let fields = validate::new_task(&input)?;
        let now = Utc::now();
        let task = Task {
            id: Uuid::now_v7().to_string(),
            title: fields.title,
            description: fields.description,
            assignee: fields.assignee,
            due_date: fields.due_date,
            status: fields.status,
            created_at: now,
            updated_at: now,
        };

        self.with_tasks(|tasks| tasks.push(task.clone()));
        info!(task_id = %task.id, status = %task.status, "Created task");
        Ok(task)
    }

    /// Merge `patch` over an existing task and refresh `updatedAt`.
    ///
    /// `id` and `createdAt` are never touched.
    pub fn update(&self, id: &str, patch: TaskPatch) -> StoreResult<Task> {
        let task = self.with_tasks(|tasks| {
            let task = tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

            let validated = validate::patch(&patch)?;
            validated.apply(task);
            task.updated_at = next_update_time(task.updated_at);
            Ok::<_, StoreError>(task.clone())
        })?;

        info!(task_id = %task.id, status = %task.status, "Updated task");
        Ok(task)
    }

    /// Remove a task, returning the removed record.
    pub fn delete(&self, id: &str) -> StoreResult<Task> {
        let task = self.with_tasks(|tasks| {
            let index = tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            Ok::<_, StoreError>(tasks.remove(index))
        })?;

        info!(task_id = %task.id, "Deleted task");
        Ok(task)
    }

    pub fn len(&self) -> usize {
        self.with_tasks(|tasks| tasks.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Current time, bumped past `previous` if the clock has not advanced.
fn next_update_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
