use std::collections::BTreeMap;

use async_trait::async_trait;
use taskdeck_core::{PagedResponse, Task, TaskDraft, TaskFilter, TaskId};
use thiserror::Error;

/// Field name (as sent on the wire) to human-readable validation message.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("not found: {}", .message.as_deref().unwrap_or("no such task"))]
    NotFound { message: Option<String> },

    #[error("invalid input: {}", .message.as_deref().unwrap_or("rejected by server"))]
    InvalidInput {
        message: Option<String>,
        field_errors: FieldErrors,
    },

    #[error("server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("json decode: {0}")]
    Decode(String),
}

impl ServiceError {
    /// The message the server put in its error body, if it sent one.
    ///
    /// Transport and decode failures never carry one, so callers fall back
    /// to their own wording.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ServiceError::NotFound { message }
            | ServiceError::InvalidInput { message, .. }
            | ServiceError::Server { message, .. } => message.as_deref(),
            ServiceError::Connection(_) | ServiceError::Decode(_) => None,
        }
    }

    /// Per-field rejections, if the server reported any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ServiceError::InvalidInput { field_errors, .. } if !field_errors.is_empty() => {
                Some(field_errors)
            }
            _ => None,
        }
    }

    pub fn not_found(id: TaskId) -> Self {
        ServiceError::NotFound {
            message: Some(format!("Task not found with id: {id}")),
        }
    }
}

/// Abstraction over the remote task service.
///
/// Controllers program against this trait.
/// `HttpService` talks to the REST API.
/// `MemoryService` keeps everything in process.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<PagedResponse<Task>, ServiceError>;
    async fn get_task(&self, id: TaskId) -> Result<Task, ServiceError>;
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ServiceError>;
    /// Full replace of the editable fields.
    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Task, ServiceError>;
    /// Flip `is_completed` and return the refreshed task.
    async fn toggle_task(&self, id: TaskId) -> Result<Task, ServiceError>;
    async fn delete_task(&self, id: TaskId) -> Result<(), ServiceError>;
}
