use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use taskdeck_core::datetime;
use taskdeck_core::{PagedResponse, Task, TaskDraft, TaskFilter, TaskId};
use tracing::debug;

use crate::{FieldErrors, ServiceError, TaskGateway};

/// Async HTTP client implementation of TaskGateway.
/// Connects to a running task service.
pub struct HttpService {
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            api_key: None,
        }
    }

    pub fn with_api_key(base_url: &str, key: String) -> Self {
        let mut svc = Self::new(base_url);
        svc.api_key = Some(key);
        svc
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {key}")),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        self.with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Connection(e.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        debug!("GET {path}");
        let builder = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query);
        handle_response(self.send(builder).await?).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        debug!("POST {path}");
        let builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        handle_response(self.send(builder).await?).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        debug!("PUT {path}");
        let builder = self
            .client
            .put(format!("{}{path}", self.base_url))
            .json(body);
        handle_response(self.send(builder).await?).await
    }

    async fn patch_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ServiceError> {
        debug!("PATCH {path}");
        let builder = self
            .client
            .patch(format!("{}{path}", self.base_url))
            .json(&serde_json::json!({}));
        handle_response(self.send(builder).await?).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        debug!("DELETE {path}");
        let builder = self.client.delete(format!("{}{path}", self.base_url));
        let resp = self.send(builder).await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

/// Query parameters for a list request. Unset criteria are left out.
pub fn list_query(filter: &TaskFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(done) = filter.is_completed {
        params.push(("isCompleted", done.to_string()));
    }
    if let Some(from) = &filter.due_date_from {
        params.push(("dueDateFrom", datetime::to_wire(from)));
    }
    if let Some(to) = &filter.due_date_to {
        params.push(("dueDateTo", datetime::to_wire(to)));
    }
    params.push(("sortBy", filter.sort_by.as_str().to_string()));
    params.push(("sortDirection", filter.sort_direction.as_str().to_string()));
    params.push(("page", filter.page.to_string()));
    params.push(("size", filter.size.get().to_string()));
    params
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    error_from_body(status, &body)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    #[serde(default)]
    field_errors: FieldErrors,
}

/// Map a non-2xx status and its body onto the failure shape controllers see.
pub(crate) fn error_from_body(status: StatusCode, body: &str) -> ServiceError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty());

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound { message },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ServiceError::InvalidInput {
            message,
            field_errors: parsed.field_errors,
        },
        other => ServiceError::Server {
            status: other.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl TaskGateway for HttpService {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<PagedResponse<Task>, ServiceError> {
        self.get_json("/api/tasks", &list_query(filter)).await
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.get_json(&format!("/api/tasks/{id}"), &[]).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ServiceError> {
        self.post_json("/api/tasks", draft).await
    }

    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Task, ServiceError> {
        self.put_json(&format!("/api/tasks/{id}"), draft).await
    }

    async fn toggle_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.patch_json(&format!("/api/tasks/{id}/toggle")).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ServiceError> {
        self.delete_req(&format!("/api/tasks/{id}")).await
    }
}
