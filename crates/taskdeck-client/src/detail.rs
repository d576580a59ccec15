use std::sync::Arc;

use taskdeck_core::{Task, TaskId};
use taskdeck_service::TaskGateway;
use tracing::{info, warn};

use crate::confirm::{delete_prompt, Confirm, DeleteOutcome};

pub const NOT_FOUND: &str = "Task not found.";
pub const TOGGLE_FAILED: &str = "Failed to toggle completion.";
pub const DELETE_FAILED: &str = "Failed to delete task.";

/// State behind the single-task view.
pub struct DetailController {
    gateway: Arc<dyn TaskGateway>,
    task: Option<Task>,
    loading: bool,
    error: Option<String>,
}

impl DetailController {
    pub fn new(gateway: Arc<dyn TaskGateway>) -> Self {
        Self {
            gateway,
            task: None,
            loading: false,
            error: None,
        }
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self, id: TaskId) {
        self.loading = true;
        self.error = None;
        match self.gateway.get_task(id).await {
            Ok(task) => self.task = Some(task),
            Err(e) => {
                warn!(id, "task fetch failed: {e}");
                self.error = Some(e.server_message().unwrap_or(NOT_FOUND).to_string());
            }
        }
        self.loading = false;
    }

    /// Swap in whatever the server returns so `updated_at` stays in sync.
    pub async fn toggle_completion(&mut self) {
        let Some(id) = self.task.as_ref().map(|t| t.id) else {
            return;
        };
        match self.gateway.toggle_task(id).await {
            Ok(updated) => {
                info!(id, completed = updated.is_completed, "task toggled");
                self.task = Some(updated);
            }
            Err(e) => {
                warn!(id, "toggle failed: {e}");
                self.error = Some(TOGGLE_FAILED.to_string());
            }
        }
    }

    /// On `Deleted` the caller should leave the view.
    pub async fn delete(&mut self, confirm: &dyn Confirm) -> DeleteOutcome {
        let Some((id, title)) = self.task.as_ref().map(|t| (t.id, t.title.clone())) else {
            return DeleteOutcome::Cancelled;
        };
        if !confirm.confirm(&delete_prompt(&title)).await {
            return DeleteOutcome::Cancelled;
        }
        match self.gateway.delete_task(id).await {
            Ok(()) => {
                info!(id, "task deleted");
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!(id, "delete failed: {e}");
                self.error = Some(DELETE_FAILED.to_string());
                DeleteOutcome::Failed
            }
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.task.as_ref().is_some_and(Task::is_overdue)
    }

    pub fn status_label(&self) -> Option<&'static str> {
        self.task.as_ref().map(Task::status_label)
    }
}
