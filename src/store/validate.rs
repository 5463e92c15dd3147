//! Field validation and normalization for task writes.
//!
//! All checks run before the store is mutated, so a rejected write never
//! leaves a partially updated task behind.

use crate::error::{StoreError, StoreResult};
use crate::types::{NewTask, Status, Task, TaskPatch};
use chrono::{DateTime, NaiveDate};

/// Maximum title length, in characters after trimming.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum description length, in characters after trimming.
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Validated field set for a new task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub due_date: Option<String>,
    pub status: Status,
}

/// Validated partial update. `due_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<Option<String>>,
    pub status: Option<Status>,
}

impl ValidatedPatch {
    /// Merge the provided fields over `task`. Timestamps are left to the caller.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(assignee) = self.assignee {
            task.assignee = assignee;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

pub fn title(value: &str) -> StoreResult<String> {
    let title = value.trim();
    if title.is_empty() {
        return Err(StoreError::MissingField("title"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(StoreError::validation(
            "title",
            format!("title must be at most {} characters", MAX_TITLE_CHARS),
        ));
    }
    Ok(title.to_string())
}

pub fn description(value: &str) -> StoreResult<String> {
    let description = value.trim();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(StoreError::validation(
            "description",
            format!(
                "description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            ),
        ));
    }
    Ok(description.to_string())
}

pub fn assignee(value: &str) -> String {
    value.trim().to_string()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. Empty input clears the date.
pub fn due_date(value: &str) -> StoreResult<Option<String>> {
    let due_date = value.trim();
    if due_date.is_empty() {
        return Ok(None);
    }
    let valid = NaiveDate::parse_from_str(due_date, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(due_date).is_ok();
    if !valid {
        return Err(StoreError::validation(
            "dueDate",
            format!("dueDate '{}' is not a valid date", due_date),
        ));
    }
    Ok(Some(due_date.to_string()))
}

pub fn status(value: &str) -> StoreResult<Status> {
    value
        .trim()
        .parse::<Status>()
        .map_err(|e| StoreError::validation("status", e.to_string()))
}

/// Validate a create request, filling defaults for omitted fields.
pub fn new_task(input: &NewTask) -> StoreResult<TaskFields> {
    let title = match input.title.as_deref() {
        Some(value) => title(value)?,
        None => return Err(StoreError::MissingField("title")),
    };
    Ok(TaskFields {
        title,
        description: input
            .description
            .as_deref()
            .map(description)
            .transpose()?
            .unwrap_or_default(),
        assignee: input.assignee.as_deref().map(assignee).unwrap_or_default(),
        due_date: input.due_date.as_deref().map(due_date).transpose()?.flatten(),
        status: input
            .status
            .as_deref()
            .map(status)
            .transpose()?
            .unwrap_or_else(Status::initial),
    })
}

/// A provided field that must carry a string; `null` is rejected.
fn non_null<'a>(field: &'static str, value: &'a Option<String>) -> StoreResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| StoreError::validation(field, format!("{} must be a string", field)))
}

/// Validate only the fields present in an update. A `null` dueDate clears it.
pub fn patch(input: &TaskPatch) -> StoreResult<ValidatedPatch> {
    Ok(ValidatedPatch {
        title: input
            .title
            .as_ref()
            .map(|value| non_null("title", value).and_then(title))
            .transpose()?,
        description: input
            .description
            .as_ref()
            .map(|value| non_null("description", value).and_then(description))
            .transpose()?,
        assignee: input
            .assignee
            .as_ref()
            .map(|value| non_null("assignee", value).map(assignee))
            .transpose()?,
        due_date: input
            .due_date
            .as_ref()
            .map(|value| value.as_deref().map(due_date).transpose().map(Option::flatten))
            .transpose()?,
        status: input
            .status
            .as_ref()
            .map(|value| non_null("status", value).and_then(status))
            .transpose()?,
    })
}
