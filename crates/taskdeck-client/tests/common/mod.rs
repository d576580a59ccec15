//! Gateway double for controller tests.
//!
//! `ScriptedGateway` answers from a `MemoryService`, records every call in
//! order, and can be told to fail the next call of a given kind.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use taskdeck_core::{PagedResponse, Task, TaskDraft, TaskFilter, TaskId};
use taskdeck_service::{FieldErrors, MemoryService, ServiceError, TaskGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
    Toggle,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(TaskFilter),
    Get(TaskId),
    Create(TaskDraft),
    Update(TaskId, TaskDraft),
    Toggle(TaskId),
    Delete(TaskId),
}

impl Call {
    fn op(&self) -> Op {
        match self {
            Call::List(_) => Op::List,
            Call::Get(_) => Op::Get,
            Call::Create(_) => Op::Create,
            Call::Update(..) => Op::Update,
            Call::Toggle(_) => Op::Toggle,
            Call::Delete(_) => Op::Delete,
        }
    }
}

pub fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub struct ScriptedGateway {
    pub store: MemoryService,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Op, ServiceError>>,
}

impl ScriptedGateway {
    /// Backed by a store whose clock advances one minute per write, so
    /// creation order is also `createdAt` order.
    pub fn new() -> Arc<Self> {
        let tick = AtomicI64::new(0);
        let store = MemoryService::with_clock(move || {
            epoch() + Duration::minutes(tick.fetch_add(1, Ordering::SeqCst))
        });
        Arc::new(Self {
            store,
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        })
    }

    /// Create tasks directly in the store without recording calls.
    pub async fn seed(&self, drafts: impl IntoIterator<Item = TaskDraft>) -> Vec<Task> {
        let mut created = Vec::new();
        for draft in drafts {
            created.push(self.store.create_task(&draft).await.unwrap());
        }
        created
    }

    pub async fn seed_titles(&self, titles: &[&str]) -> Vec<Task> {
        self.seed(titles.iter().map(|t| TaskDraft::new(*t))).await
    }

    pub fn fail_next(&self, op: Op, err: ServiceError) {
        self.failures.lock().unwrap().insert(op, err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| c.op() == op).count()
    }

    pub fn list_requests(&self) -> Vec<TaskFilter> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::List(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) -> Result<(), ServiceError> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskGateway for ScriptedGateway {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<PagedResponse<Task>, ServiceError> {
        self.record(Call::List(filter.clone()))?;
        self.store.list_tasks(filter).await
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.record(Call::Get(id))?;
        self.store.get_task(id).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ServiceError> {
        self.record(Call::Create(draft.clone()))?;
        self.store.create_task(draft).await
    }

    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Task, ServiceError> {
        self.record(Call::Update(id, draft.clone()))?;
        self.store.update_task(id, draft).await
    }

    async fn toggle_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.record(Call::Toggle(id))?;
        self.store.toggle_task(id).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ServiceError> {
        self.record(Call::Delete(id))?;
        self.store.delete_task(id).await
    }
}

pub fn connection_refused() -> ServiceError {
    ServiceError::Connection("connection refused".into())
}

pub fn field_rejection(fields: &[(&str, &str)]) -> ServiceError {
    let field_errors: FieldErrors = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServiceError::InvalidInput {
        message: Some("Validation failed".into()),
        field_errors,
    }
}
