//! In-process stand-in for the remote task service.
//!
//! Serves the REST contract from a `MemoryService` on 127.0.0.1:0 and keeps
//! every raw list query so tests can check what went over the wire.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskdeck_core::datetime;
use taskdeck_core::{PageSize, SortBy, SortDirection, TaskDraft, TaskFilter, TaskId};
use taskdeck_service::{MemoryService, ServiceError, TaskGateway};
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct StubState {
    pub service: Arc<MemoryService>,
    pub list_queries: Arc<Mutex<Vec<String>>>,
}

type ApiError = (StatusCode, Json<Value>);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    is_completed: Option<bool>,
    due_date_from: Option<String>,
    due_date_to: Option<String>,
    sort_by: Option<String>,
    sort_direction: Option<String>,
    page: Option<u32>,
    size: Option<u32>,
}

fn bad_request(msg: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": msg })))
}

fn to_error(e: ServiceError) -> ApiError {
    match e {
        ServiceError::NotFound { message } => {
            (StatusCode::NOT_FOUND, Json(json!({ "message": message })))
        }
        ServiceError::InvalidInput {
            message,
            field_errors,
        } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": message, "fieldErrors": field_errors })),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": other.to_string() })),
        ),
    }
}

fn parse_bound(raw: Option<String>) -> Result<Option<chrono::NaiveDateTime>, ApiError> {
    match raw {
        Some(raw) => datetime::parse_input(&raw).map_err(|e| bad_request(e.to_string())),
        None => Ok(None),
    }
}

async fn list_tasks(
    State(state): State<StubState>,
    RawQuery(raw): RawQuery,
    Query(q): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .list_queries
        .lock()
        .unwrap()
        .push(raw.unwrap_or_default());
    let filter = TaskFilter {
        is_completed: q.is_completed,
        due_date_from: parse_bound(q.due_date_from)?,
        due_date_to: parse_bound(q.due_date_to)?,
        sort_by: q
            .sort_by
            .as_deref()
            .and_then(SortBy::parse_str)
            .unwrap_or_default(),
        sort_direction: q
            .sort_direction
            .as_deref()
            .and_then(SortDirection::parse_str)
            .unwrap_or_default(),
        page: q.page.unwrap_or(0),
        size: q.size.and_then(PageSize::from_u32).unwrap_or_default(),
    };
    state
        .service
        .list_tasks(&filter)
        .await
        .map(|p| Json(json!(p)))
        .map_err(to_error)
}

async fn get_task(
    State(state): State<StubState>,
    Path(id): Path<TaskId>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .get_task(id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn create_task(
    State(state): State<StubState>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state
        .service
        .create_task(&draft)
        .await
        .map(|t| (StatusCode::CREATED, Json(json!(t))))
        .map_err(to_error)
}

async fn update_task(
    State(state): State<StubState>,
    Path(id): Path<TaskId>,
    Json(draft): Json<TaskDraft>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .update_task(id, &draft)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn toggle_task(
    State(state): State<StubState>,
    Path(id): Path<TaskId>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .toggle_task(id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn delete_task(
    State(state): State<StubState>,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete_task(id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

pub fn router(state: StubState) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/toggle", patch(toggle_task))
        .with_state(state)
}

/// A running stub server with its base_url and shared state.
pub struct TestServer {
    pub base_url: String,
    pub state: StubState,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn last_list_query(&self) -> String {
        self.state
            .list_queries
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = StubState {
        service: Arc::new(MemoryService::new()),
        list_queries: Arc::new(Mutex::new(Vec::new())),
    };
    let app = router(state.clone());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{addr}"),
        state,
        _handle: handle,
    }
}

/// Answer every request with a fixed status and JSON body.
pub async fn spawn_canned_server(status: StatusCode, body: Value) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(move || {
        let body = body.clone();
        async move { (status, Json(body)) }
    });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
