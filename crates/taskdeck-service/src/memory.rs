use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use taskdeck_core::task::TITLE_MAX_CHARS;
use taskdeck_core::{PagedResponse, SortBy, SortDirection, Task, TaskDraft, TaskFilter, TaskId};

use crate::{FieldErrors, ServiceError, TaskGateway};

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Default)]
struct Store {
    next_id: TaskId,
    tasks: BTreeMap<TaskId, Task>,
}

/// In-process implementation of the task service contract.
///
/// Applies the same filtering, ordering, paging and validation rules as the
/// remote service, so it can stand in for it in tests and local wiring.
pub struct MemoryService {
    store: Mutex<Store>,
    clock: Clock,
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryService {
    pub fn new() -> Self {
        Self::with_clock(|| Local::now().naive_local())
    }

    pub fn with_clock(clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        Self {
            store: Mutex::new(Store {
                next_id: 1,
                tasks: BTreeMap::new(),
            }),
            clock: Box::new(clock),
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.store().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filter, order and page the stored tasks.
    pub fn query(&self, filter: &TaskFilter) -> PagedResponse<Task> {
        let mut matching: Vec<Task> = self
            .store()
            .tasks
            .values()
            .filter(|t| matches(t, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare(a, b, filter.sort_by, filter.sort_direction));
        PagedResponse::from_sorted(matching, filter.page, filter.size.get())
    }
}

fn matches(task: &Task, filter: &TaskFilter) -> bool {
    if let Some(done) = filter.is_completed {
        if task.is_completed != done {
            return false;
        }
    }
    if filter.due_date_from.is_some() || filter.due_date_to.is_some() {
        let Some(due) = task.due_date else {
            return false;
        };
        if filter.due_date_from.is_some_and(|from| due < from) {
            return false;
        }
        if filter.due_date_to.is_some_and(|to| due > to) {
            return false;
        }
    }
    true
}

/// Ties keep id order. Missing due dates sort last ascending, first descending.
fn compare(a: &Task, b: &Task, sort_by: SortBy, direction: SortDirection) -> Ordering {
    let primary = match sort_by {
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        SortBy::Title => a.title.cmp(&b.title),
        SortBy::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    };
    let primary = match direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then(a.id.cmp(&b.id))
}

fn validate(draft: &TaskDraft) -> Result<(), ServiceError> {
    let mut field_errors = FieldErrors::new();
    if draft.title.trim().is_empty() {
        field_errors.insert("title".into(), "Title is mandatory".into());
    } else if draft.title.chars().count() > TITLE_MAX_CHARS {
        field_errors.insert(
            "title".into(),
            format!("Title must not exceed {TITLE_MAX_CHARS} characters"),
        );
    }
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput {
            message: Some("Validation failed".into()),
            field_errors,
        })
    }
}

#[async_trait]
impl TaskGateway for MemoryService {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<PagedResponse<Task>, ServiceError> {
        Ok(self.query(filter))
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.store()
            .tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found(id))
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ServiceError> {
        validate(draft)?;
        let now = (self.clock)();
        let mut store = self.store();
        let id = store.next_id;
        store.next_id += 1;
        let task = Task {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            is_completed: draft.is_completed,
            due_date: draft.due_date,
            created_at: now,
            updated_at: None,
        };
        store.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Task, ServiceError> {
        validate(draft)?;
        let now = (self.clock)();
        let mut store = self.store();
        let task = store
            .tasks
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(id))?;
        task.title = draft.title.clone();
        task.description = draft.description.clone();
        task.due_date = draft.due_date;
        task.is_completed = draft.is_completed;
        task.updated_at = Some(now);
        Ok(task.clone())
    }

    async fn toggle_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        let now = (self.clock)();
        let mut store = self.store();
        let task = store
            .tasks
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(id))?;
        task.is_completed = !task.is_completed;
        task.updated_at = Some(now);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ServiceError> {
        self.store()
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found(id))
    }
}
