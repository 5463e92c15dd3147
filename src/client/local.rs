use super::{ClientResult, TaskApi};
use crate::store::TaskStore;
use crate::types::{NewTask, Status, Task, TaskFilter, TaskPatch};
use async_trait::async_trait;

/// [`TaskApi`] backed by an in-process store, for offline use.
#[derive(Clone, Default)]
pub struct LocalTaskApi {
    store: TaskStore,
}

impl LocalTaskApi {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }
}

#[async_trait]
impl TaskApi for LocalTaskApi {
    async fn list_tasks(&self, filter: &TaskFilter) -> ClientResult<Vec<Task>> {
        Ok(self.store.list(&filter.clone().normalized()))
    }

    async fn create_task(&self, input: &NewTask) -> ClientResult<Task> {
        Ok(self.store.create(input.clone())?)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> ClientResult<Task> {
        Ok(self.store.update(id, patch.clone())?)
    }

    async fn delete_task(&self, id: &str) -> ClientResult<Task> {
        Ok(self.store.delete(id)?)
    }

    async fn list_statuses(&self) -> ClientResult<Vec<String>> {
        Ok(Status::names().into_iter().map(String::from).collect())
    }
}
