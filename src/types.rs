//! Core types for the Kanban board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow stage a task occupies.
///
/// The declaration order is the fixed display order of the board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Idea,
    Assigned,
    Drafting,
    Editing,
    #[serde(rename = "Fact-Check")]
    FactCheck,
    Scheduled,
    Published,
}

impl Status {
    /// All stages in display order.
    pub const ALL: [Status; 7] = [
        Status::Idea,
        Status::Assigned,
        Status::Drafting,
        Status::Editing,
        Status::FactCheck,
        Status::Scheduled,
        Status::Published,
    ];

    /// The stage new tasks start in.
    pub fn initial() -> Self {
        Status::ALL[0]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idea => "Idea",
            Status::Assigned => "Assigned",
            Status::Drafting => "Drafting",
            Status::Editing => "Editing",
            Status::FactCheck => "Fact-Check",
            Status::Scheduled => "Scheduled",
            Status::Published => "Published",
        }
    }

    /// Stage names in display order, as served by `/api/statuses`.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Status::as_str).collect()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the workflow stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Must be one of: {}",
            self.0,
            Status::names().join(", ")
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for Status {
    type Err = UnknownStatus;

    /// Exact, case-sensitive match against the stage names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A task on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub due_date: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request.
///
/// Every field is optional at the wire level so that a missing title is a
/// validation error with a readable message rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Partial update of a task.
///
/// Only the mutable fields are listed; `id`, `createdAt` and `updatedAt` in an
/// incoming body are ignored. Each field is tri-state: absent (`None`),
/// explicit `null` (`Some(None)`) or a value (`Some(Some(_))`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<String>>,
}

/// Keeps an explicit `null` distinct from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    /// A patch that only moves the task to another stage.
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(Some(status.as_str().to_string())),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }
}

/// Filter for listing tasks. Absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl TaskFilter {
    /// Drop empty filter values so `?status=` behaves like no filter.
    pub fn normalized(self) -> Self {
        Self {
            status: self.status.filter(|s| !s.trim().is_empty()),
            assignee: self.assignee.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Status is an exact match; assignee is a case-insensitive substring match.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(ref status) = self.status {
            if task.status.as_str() != status.trim() {
                return false;
            }
        }
        if let Some(ref assignee) = self.assignee {
            let needle = assignee.trim().to_lowercase();
            if !task.assignee.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Response body of `DELETE /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub deleted_task: Task,
}
