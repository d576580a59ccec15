//! Plain-text views over controller state.

use std::fmt::Write;

use chrono::NaiveDateTime;
use taskdeck_core::Task;

use crate::detail::DetailController;
use crate::form::{Field, FormController};
use crate::list::ListController;

const ROW_DATE: &str = "%b %-d, %Y %H:%M";
const LONG_DATE: &str = "%B %-d, %Y %H:%M";

fn row(task: &Task, now: NaiveDateTime) -> String {
    let check = if task.is_completed { "[x]" } else { "[ ]" };
    let description = task
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or("—");
    let due = match task.due_date {
        Some(due) if task.is_overdue_at(now) => format!("{} (overdue)", due.format(ROW_DATE)),
        Some(due) => due.format(ROW_DATE).to_string(),
        None => "No due date".to_string(),
    };
    format!(
        "{check} #{:<4} {:<32} {:<24} {:<28} {}",
        task.id,
        task.title,
        description,
        due,
        task.status_label()
    )
}

pub fn list_view(list: &ListController, now: NaiveDateTime) -> String {
    let mut out = String::new();
    if let Some(err) = list.error() {
        let _ = writeln!(out, "Error: {err}");
    }
    if list.is_loading() {
        let _ = writeln!(out, "Loading tasks...");
        return out;
    }
    if list.is_empty_state() {
        let _ = writeln!(out, "No tasks found");
        let _ = writeln!(out, "Try adjusting your filters or create a new task.");
    } else {
        for task in list.tasks() {
            let _ = writeln!(out, "{}", row(task, now));
        }
    }
    let controls = list.page_controls();
    if controls.visible {
        let _ = writeln!(
            out,
            "{} Page {} of {} {}",
            if controls.can_go_back { "«" } else { " " },
            controls.page_number,
            controls.total_pages,
            if controls.can_go_forward { "»" } else { " " },
        );
    }
    if let Some(resp) = list.response() {
        let _ = writeln!(out, "Total: {} task(s)", resp.total_elements);
    }
    out
}

pub fn detail_view(detail: &DetailController, now: NaiveDateTime) -> String {
    let mut out = String::new();
    if detail.is_loading() {
        let _ = writeln!(out, "Loading...");
    }
    if let Some(err) = detail.error() {
        let _ = writeln!(out, "Error: {err}");
    }
    let Some(task) = detail.task() else {
        return out;
    };
    let _ = writeln!(out, "{}", task.title);
    let _ = writeln!(out, "Status: {}", task.status_label());
    match task.due_date {
        Some(due) => {
            let overdue = if task.is_overdue_at(now) { " (Overdue)" } else { "" };
            let _ = writeln!(out, "Due: {}{overdue}", due.format(LONG_DATE));
        }
        None => {
            let _ = writeln!(out, "No due date set");
        }
    }
    match task.description.as_deref().filter(|d| !d.is_empty()) {
        Some(d) => {
            let _ = writeln!(out, "\n{d}\n");
        }
        None => {
            let _ = writeln!(out, "\nNo description provided.\n");
        }
    }
    let _ = writeln!(out, "Created: {}", task.created_at.format(LONG_DATE));
    if let Some(updated) = task.updated_at {
        let _ = writeln!(out, "Last Updated: {}", updated.format(LONG_DATE));
    }
    let _ = writeln!(out, "Task ID: #{}", task.id);
    out
}

/// Banner plus every field message currently visible.
pub fn form_errors(form: &FormController) -> String {
    let mut out = String::new();
    if let Some(err) = form.server_error() {
        let _ = writeln!(out, "Error: {err}");
    }
    for field in Field::ALL {
        for msg in form.visible_errors(*field) {
            let _ = writeln!(out, "  {msg}");
        }
    }
    out
}
