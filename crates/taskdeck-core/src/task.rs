use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

pub const TITLE_MAX_CHARS: usize = 100;

/// A task as persisted by the remote service.
///
/// `id` and `created_at` are assigned by the server on creation and never
/// change afterwards. `updated_at` stays empty until the first modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    /// Overdue means pending with a due date strictly in the past.
    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        if self.is_completed {
            return false;
        }
        match self.due_date {
            Some(due) => due < now,
            None => false,
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Local::now().naive_local())
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_completed {
            "Completed"
        } else {
            "Pending"
        }
    }

    /// The draft that would recreate this task's editable fields.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            is_completed: self.is_completed,
            due_date: self.due_date,
        }
    }
}

/// Payload for create and full-replace update. Has no identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}
