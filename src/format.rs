//! Markdown rendering of the board for terminal output.

use crate::client::Column;
use crate::types::Task;

/// Format a single card as a markdown list item.
pub fn format_task_markdown(task: &Task) -> String {
    let mut md = format!("- **{}** `{}`", task.title, task.id);

    if !task.assignee.is_empty() {
        md.push_str(&format!(" @{}", task.assignee));
    }

    if let Some(ref due) = task.due_date {
        md.push_str(&format!(" (due {})", due));
    }

    md.push('\n');
    md
}

/// Format the board as one markdown section per column.
pub fn format_board_markdown(columns: &[Column<'_>]) -> String {
    let mut md = String::new();

    for column in columns {
        md.push_str(&format!("## {} ({})\n", column.status, column.tasks.len()));
        if column.tasks.is_empty() {
            md.push_str("_empty_\n");
        }
        for task in &column.tasks {
            md.push_str(&format_task_markdown(task));
        }
        md.push('\n');
    }

    md
}
