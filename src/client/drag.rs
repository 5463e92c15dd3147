//! Drag-and-drop state for task cards.
//!
//! `Idle -> Dragging(task) -> (dropped on a column | released outside) -> Idle`

use crate::types::Status;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { task_id: String },
}

/// What a drop asks the board to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Move the task to another column.
    Move { task_id: String, status: Status },
    /// Nothing to do: no drag in progress, unknown task, or same column.
    NoOp,
}

impl DragState {
    /// Start dragging a card. A drag already in progress is abandoned.
    pub fn begin(&mut self, task_id: impl Into<String>) {
        *self = DragState::Dragging {
            task_id: task_id.into(),
        };
    }

    /// Drop the dragged card on the `target` column and return to idle.
    ///
    /// `current_status` resolves a task id to the column it is in now.
    pub fn drop_on<F>(&mut self, target: Status, current_status: F) -> DropOutcome
    where
        F: FnOnce(&str) -> Option<Status>,
    {
        let DragState::Dragging { task_id } = std::mem::take(self) else {
            return DropOutcome::NoOp;
        };
        match current_status(&task_id) {
            Some(current) if current != target => DropOutcome::Move {
                task_id,
                status: target,
            },
            _ => DropOutcome::NoOp,
        }
    }

    /// Released outside any column.
    pub fn release(&mut self) {
        *self = DragState::Idle;
    }

    pub fn dragged_task(&self) -> Option<&str> {
        match self {
            DragState::Dragging { task_id } => Some(task_id),
            DragState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }
}
