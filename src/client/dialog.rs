//! Create/edit dialog state.
//!
//! `Closed -> Open(Create, empty form) | Open(Edit, form from task) -> Closed`

use super::{ClientError, ClientResult};
use crate::types::{NewTask, Status, Task, TaskPatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit { task_id: String },
}

/// Editable fields of the dialog, held as raw user input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub due_date: String,
    pub status: Status,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            assignee: task.assignee.clone(),
            due_date: task.due_date.clone().unwrap_or_default(),
            status: task.status,
        }
    }

    fn checked_title(&self) -> ClientResult<String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ClientError::Validation("Title is required".to_string()));
        }
        Ok(title.to_string())
    }

    /// Build a create request. An empty title is rejected without contacting the server.
    pub fn to_new_task(&self) -> ClientResult<NewTask> {
        let due_date = self.due_date.trim();
        Ok(NewTask {
            title: Some(self.checked_title()?),
            description: Some(self.description.clone()),
            assignee: Some(self.assignee.clone()),
            due_date: (!due_date.is_empty()).then(|| due_date.to_string()),
            status: Some(self.status.as_str().to_string()),
        })
    }

    /// Build an update carrying every editable field; an empty due date clears it.
    pub fn to_patch(&self) -> ClientResult<TaskPatch> {
        Ok(TaskPatch {
            title: Some(Some(self.checked_title()?)),
            description: Some(Some(self.description.clone())),
            assignee: Some(Some(self.assignee.clone())),
            due_date: Some(Some(self.due_date.trim().to_string())),
            status: Some(Some(self.status.as_str().to_string())),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialogState {
    #[default]
    Closed,
    Open { mode: DialogMode, form: TaskForm },
}

impl DialogState {
    /// "New Task": open with an empty form in the first stage.
    pub fn open_create(&mut self) {
        *self = DialogState::Open {
            mode: DialogMode::Create,
            form: TaskForm::default(),
        };
    }

    /// Card selected: open pre-filled from `task`.
    pub fn open_edit(&mut self, task: &Task) {
        *self = DialogState::Open {
            mode: DialogMode::Edit {
                task_id: task.id.clone(),
            },
            form: TaskForm::from_task(task),
        };
    }

    pub fn close(&mut self) {
        *self = DialogState::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, DialogState::Open { .. })
    }

    pub fn mode(&self) -> Option<&DialogMode> {
        match self {
            DialogState::Open { mode, .. } => Some(mode),
            DialogState::Closed => None,
        }
    }

    pub fn form(&self) -> Option<&TaskForm> {
        match self {
            DialogState::Open { form, .. } => Some(form),
            DialogState::Closed => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        match self {
            DialogState::Open { form, .. } => Some(form),
            DialogState::Closed => None,
        }
    }

    /// Whether the dialog is editing `task_id`.
    pub fn is_editing(&self, task_id: &str) -> bool {
        matches!(self.mode(), Some(DialogMode::Edit { task_id: id }) if id == task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task() -> Task {
        let now = Utc::now();
        Task {
            id: "t-1".into(),
            title: "Write launch article".into(),
            description: "Long form".into(),
            assignee: "Ada".into(),
            due_date: Some("2026-11-01".into()),
            status: Status::Drafting,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_open_create_starts_empty() {
        let mut dialog = DialogState::default();
        assert!(!dialog.is_open());

        dialog.open_create();
        assert_eq!(dialog.mode(), Some(&DialogMode::Create));
        assert_eq!(dialog.form(), Some(&TaskForm::default()));
        assert_eq!(dialog.form().unwrap().status, Status::Idea);
    }

    #[test]
    fn test_open_edit_prefills_form() {
        let mut dialog = DialogState::default();
        dialog.open_edit(&task());

        assert!(dialog.is_editing("t-1"));
        assert!(!dialog.is_editing("t-2"));
        let form = dialog.form().unwrap();
        assert_eq!(form.title, "Write launch article");
        assert_eq!(form.due_date, "2026-11-01");
        assert_eq!(form.status, Status::Drafting);

        dialog.close();
        assert_eq!(dialog, DialogState::Closed);
        assert!(dialog.form_mut().is_none());
    }

    #[test]
    fn test_blank_title_rejected_locally() {
        let form = TaskForm {
            title: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            form.to_new_task(),
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(form.to_patch(), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_requests_from_form() {
        let mut form = TaskForm::from_task(&task());
        form.due_date = "  ".into();
        form.title = " Renamed ".into();

        let new_task = form.to_new_task().unwrap();
        assert_eq!(new_task.title.as_deref(), Some("Renamed"));
        assert_eq!(new_task.due_date, None);
        assert_eq!(new_task.status.as_deref(), Some("Drafting"));

        let patch = form.to_patch().unwrap();
        assert_eq!(patch.due_date, Some(Some(String::new())));
        assert_eq!(patch.assignee, Some(Some("Ada".to_string())));
    }
}
