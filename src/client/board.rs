use super::{
    ClientError, ClientResult, DialogMode, DialogState, DragState, DropOutcome, LocalTaskApi,
    TaskApi, TaskForm,
};
use crate::types::{Status, Task, TaskFilter, TaskPatch};
use tracing::{debug, warn};

/// How the board catches up with the server after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reconcile {
    /// Replace the whole list with a fresh fetch.
    #[default]
    Refetch,
    /// Merge only the task returned by the mutation.
    Merge,
}

/// One stage column, tasks in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

/// Confirmed server-side change to fold into the local list.
enum Change {
    Upserted(Task),
    Removed(String),
}

/// Client-side board state synchronized with a [`TaskApi`].
///
/// The task list is only ever replaced by a successful response. Failed
/// calls leave it untouched and record the error for a retry.
pub struct Board<A> {
    api: A,
    tasks: Vec<Task>,
    dialog: DialogState,
    drag: DragState,
    reconcile: Reconcile,
    last_error: Option<String>,
    statuses_checked: bool,
}

impl Board<LocalTaskApi> {
    /// A board with no server behind it: tasks live in-process only.
    pub fn offline() -> Self {
        Self::new(LocalTaskApi::default())
    }
}

impl<A: TaskApi> Board<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            dialog: DialogState::default(),
            drag: DragState::default(),
            reconcile: Reconcile::default(),
            last_error: None,
            statuses_checked: false,
        }
    }

    pub fn with_reconcile(mut self, reconcile: Reconcile) -> Self {
        self.reconcile = reconcile;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn dialog(&self) -> &DialogState {
        &self.dialog
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    /// Message of the last failed call, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Tasks grouped into the fixed stage columns, in display order.
    pub fn columns(&self) -> Vec<Column<'_>> {
        Status::ALL
            .into_iter()
            .map(|status| Column {
                status,
                tasks: self
                    .tasks
                    .iter()
                    .filter(|task| task.status == status)
                    .collect(),
            })
            .collect()
    }

    fn record<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                warn!("Board request failed: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
        result
    }

    async fn fetch(&self) -> ClientResult<Vec<Task>> {
        self.api.list_tasks(&TaskFilter::default()).await
    }

    /// Compare the server's stage list with ours once per board.
    async fn check_statuses(&mut self) -> ClientResult<()> {
        if self.statuses_checked {
            return Ok(());
        }
        let remote = self.api.list_statuses().await?;
        if remote != Status::names() {
            warn!(
                ?remote,
                local = ?Status::names(),
                "Server stage list does not match the board columns"
            );
        }
        self.statuses_checked = true;
        Ok(())
    }

    /// Replace the local list with the server's.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let result = match self.check_statuses().await {
            Ok(()) => self.fetch().await,
            Err(e) => Err(e),
        };
        let tasks = self.record(result)?;
        debug!(count = tasks.len(), "Board refreshed");
        self.tasks = tasks;
        Ok(())
    }

    /// Retry after a failure. Always a full refresh.
    pub async fn retry(&mut self) -> ClientResult<()> {
        self.refresh().await
    }

    async fn reconcile(&mut self, change: Change) {
        if self.reconcile == Reconcile::Refetch {
            match self.fetch().await {
                Ok(tasks) => {
                    self.tasks = tasks;
                    return;
                }
                Err(e) => {
                    // The mutation itself succeeded, so keep the view consistent with it.
                    warn!("Refetch after mutation failed: {}", e);
                    self.last_error = Some(e.to_string());
                }
            }
        }
        self.merge(change);
    }

    fn merge(&mut self, change: Change) {
        match change {
            Change::Upserted(task) => {
                match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
                    Some(existing) => *existing = task,
                    None => self.tasks.push(task),
                }
            }
            Change::Removed(id) => self.tasks.retain(|task| task.id != id),
        }
    }

    /// "New Task" button.
    pub fn open_create(&mut self) {
        self.dialog.open_create();
    }

    /// Card selected. Returns false if the task is not on the board.
    pub fn open_edit(&mut self, task_id: &str) -> bool {
        match self.tasks.iter().find(|task| task.id == task_id) {
            Some(task) => {
                self.dialog.open_edit(task);
                true
            }
            None => false,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        self.dialog.form_mut()
    }

    pub fn cancel_dialog(&mut self) {
        self.dialog.close();
    }

    /// Submit the open dialog. The dialog stays open if the request fails.
    pub async fn submit_dialog(&mut self) -> ClientResult<Task> {
        let DialogState::Open { mode, form } = &self.dialog else {
            return Err(ClientError::Validation("No task dialog is open".to_string()));
        };

        let result = match mode {
            DialogMode::Create => match form.to_new_task() {
                Ok(input) => self.api.create_task(&input).await,
                Err(e) => Err(e),
            },
            DialogMode::Edit { task_id } => match form.to_patch() {
                Ok(patch) => self.api.update_task(task_id, &patch).await,
                Err(e) => Err(e),
            },
        };
        let task = self.record(result)?;

        self.dialog.close();
        self.reconcile(Change::Upserted(task.clone())).await;
        Ok(task)
    }

    pub async fn delete_task(&mut self, task_id: &str) -> ClientResult<Task> {
        let result = self.api.delete_task(task_id).await;
        let task = self.record(result)?;

        if self.dialog.is_editing(task_id) {
            self.dialog.close();
        }
        self.reconcile(Change::Removed(task.id.clone())).await;
        Ok(task)
    }

    pub fn begin_drag(&mut self, task_id: &str) {
        self.drag.begin(task_id);
    }

    /// Released outside any column: no request is made.
    pub fn release_drag(&mut self) {
        self.drag.release();
    }

    /// Drop the dragged card on `status`.
    ///
    /// Returns the updated task, or `None` when the drop changes nothing.
    pub async fn drop_on(&mut self, status: Status) -> ClientResult<Option<Task>> {
        let tasks = &self.tasks;
        let outcome = self.drag.drop_on(status, |id| {
            tasks.iter().find(|task| task.id == id).map(|task| task.status)
        });

        let DropOutcome::Move { task_id, status } = outcome else {
            return Ok(None);
        };

        let result = self
            .api
            .update_task(&task_id, &TaskPatch::status(status))
            .await;
        let task = self.record(result)?;
        self.reconcile(Change::Upserted(task.clone())).await;
        Ok(Some(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewTask;

    async fn seeded_board() -> (Board<LocalTaskApi>, Task) {
        let mut board = Board::offline();
        let task = board
            .api()
            .store()
            .create(NewTask::titled("Write launch article"))
            .unwrap();
        board.refresh().await.unwrap();
        (board, task)
    }

    #[tokio::test]
    async fn test_columns_follow_stage_order() {
        let (board, task) = seeded_board().await;
        let columns = board.columns();

        assert_eq!(columns.len(), Status::ALL.len());
        assert_eq!(columns[0].status, Status::Idea);
        assert_eq!(columns[0].tasks, vec![&task]);
        assert!(columns[1..].iter().all(|c| c.tasks.is_empty()));
    }

    #[tokio::test]
    async fn test_merge_mode_does_not_refetch() {
        let (board, task) = seeded_board().await;
        let mut board = board.with_reconcile(Reconcile::Merge);

        // A task created behind the board's back stays invisible under Merge.
        board
            .api()
            .store()
            .create(NewTask::titled("Side channel"))
            .unwrap();

        board.begin_drag(&task.id);
        let moved = board.drop_on(Status::Assigned).await.unwrap().unwrap();
        assert_eq!(moved.status, Status::Assigned);
        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.tasks()[0].status, Status::Assigned);
    }

    #[tokio::test]
    async fn test_submit_without_dialog_fails() {
        let mut board = Board::offline();
        let result = board.submit_dialog().await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn test_open_edit_unknown_task() {
        let mut board = Board::offline();
        assert!(!board.open_edit("missing"));
        assert!(!board.dialog().is_open());
    }
}
