use std::sync::Arc;

use taskdeck_core::datetime;
use taskdeck_core::{PagedResponse, Task, TaskFilter, TaskId};
use taskdeck_service::{ServiceError, TaskGateway};
use tracing::{debug, info, warn};

use crate::confirm::{delete_prompt, Confirm, DeleteOutcome};

pub const LOAD_FAILED: &str = "Failed to load tasks. Is the backend running?";
pub const TOGGLE_FAILED: &str = "Failed to toggle task completion.";
pub const DELETE_FAILED: &str = "Failed to delete task.";

/// A list request that has been issued but not yet applied.
///
/// Only the ticket from the most recent `begin_load` is accepted by
/// `finish_load`; older ones are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    pub request: TaskFilter,
}

/// Render-ready state of the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControls {
    /// Only shown when there is more than one page.
    pub visible: bool,
    /// First / previous.
    pub can_go_back: bool,
    /// Next / last.
    pub can_go_forward: bool,
    /// 1-based, for display.
    pub page_number: u32,
    pub total_pages: u32,
}

/// Filter, sort and pagination state for the task list.
pub struct ListController {
    gateway: Arc<dyn TaskGateway>,
    filter: TaskFilter,
    due_date_from: String,
    due_date_to: String,
    response: Option<PagedResponse<Task>>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl ListController {
    pub fn new(gateway: Arc<dyn TaskGateway>) -> Self {
        Self {
            gateway,
            filter: TaskFilter::default(),
            due_date_from: String::new(),
            due_date_to: String::new(),
            response: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Mutate filter controls. Follow with `on_filter_change`.
    pub fn filter_mut(&mut self) -> &mut TaskFilter {
        &mut self.filter
    }

    pub fn due_date_from(&self) -> &str {
        &self.due_date_from
    }

    pub fn due_date_to(&self) -> &str {
        &self.due_date_to
    }

    pub fn set_due_date_from(&mut self, raw: impl Into<String>) {
        self.due_date_from = raw.into();
    }

    pub fn set_due_date_to(&mut self, raw: impl Into<String>) {
        self.due_date_to = raw.into();
    }

    /// Rows of the current page, in server order.
    pub fn tasks(&self) -> &[Task] {
        self.response
            .as_ref()
            .map(|r| r.content.as_slice())
            .unwrap_or_default()
    }

    pub fn response(&self) -> Option<&PagedResponse<Task>> {
        self.response.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The empty state shows once a load has settled with no rows.
    pub fn is_empty_state(&self) -> bool {
        !self.loading && self.tasks().is_empty()
    }

    pub fn page_controls(&self) -> PageControls {
        let total_pages = self.response.as_ref().map_or(0, |r| r.total_pages);
        PageControls {
            visible: total_pages > 1,
            can_go_back: self.filter.page > 0,
            can_go_forward: self.response.as_ref().is_some_and(|r| !r.last),
            page_number: self.filter.page + 1,
            total_pages,
        }
    }

    /// The filter actually sent: the submitted filter plus any raw date bounds.
    fn request_filter(&self) -> Result<TaskFilter, String> {
        let mut request = self.filter.clone();
        for (raw, slot) in [
            (&self.due_date_from, &mut request.due_date_from),
            (&self.due_date_to, &mut request.due_date_to),
        ] {
            match datetime::parse_input(raw) {
                Ok(Some(dt)) => *slot = Some(dt),
                Ok(None) => {}
                Err(_) => return Err(format!("Invalid due date filter: {}", raw.trim())),
            }
        }
        Ok(request)
    }

    /// Mark a load as in flight and return the request to send.
    ///
    /// Returns `None` when the raw date inputs do not parse; `error` then
    /// says why and nothing should be sent.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        match self.request_filter() {
            Ok(request) => {
                debug!(generation = self.generation, page = request.page, "list load issued");
                Some(LoadTicket {
                    generation: self.generation,
                    request,
                })
            }
            Err(msg) => {
                self.loading = false;
                self.error = Some(msg);
                None
            }
        }
    }

    /// Apply the outcome of a load. Returns false if the ticket was stale.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<PagedResponse<Task>, ServiceError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "dropping superseded list response"
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                debug!(
                    page = page.page,
                    rows = page.content.len(),
                    total = page.total_elements,
                    "list loaded"
                );
                self.response = Some(page);
            }
            Err(e) => {
                warn!("list load failed: {e}");
                self.error = Some(e.server_message().unwrap_or(LOAD_FAILED).to_string());
            }
        }
        true
    }

    async fn fetch(&mut self) -> bool {
        let Some(ticket) = self.begin_load() else {
            return false;
        };
        let result = self.gateway.list_tasks(&ticket.request).await;
        self.finish_load(ticket, result) && self.error.is_none()
    }

    /// Fetch the current page.
    ///
    /// If the server answers with an empty page past the end (the rows it
    /// held were deleted), step back to the final page and fetch once more.
    pub async fn load(&mut self) {
        if !self.fetch().await {
            return;
        }
        let past_end = self
            .response
            .as_ref()
            .filter(|r| r.is_past_end())
            .map(|r| r.last_page().unwrap_or(0));
        if let Some(last) = past_end {
            debug!(from = self.filter.page, to = last, "page past the end, stepping back");
            self.filter.page = last;
            self.fetch().await;
        }
    }

    /// Any filter criterion changed: pagination starts over.
    pub async fn on_filter_change(&mut self) {
        self.filter.page = 0;
        self.load().await;
    }

    /// Jump to a page, clamped to the pages the last response reported.
    pub async fn change_page(&mut self, page: u32) {
        self.filter.page = match &self.response {
            Some(r) => page.min(r.last_page().unwrap_or(0)),
            None => page,
        };
        self.load().await;
    }

    pub async fn reset_filters(&mut self) {
        self.filter = TaskFilter::default();
        self.due_date_from.clear();
        self.due_date_to.clear();
        self.load().await;
    }

    /// Flip completion on the server and swap in the row it returns.
    pub async fn toggle_task(&mut self, id: TaskId) {
        match self.gateway.toggle_task(id).await {
            Ok(updated) => {
                info!(id, completed = updated.is_completed, "task toggled");
                if let Some(row) = self
                    .response
                    .as_mut()
                    .and_then(|r| r.content.iter_mut().find(|t| t.id == id))
                {
                    *row = updated;
                }
            }
            Err(e) => {
                warn!(id, "toggle failed: {e}");
                self.error = Some(TOGGLE_FAILED.to_string());
            }
        }
    }

    /// Ask, delete, then reload the same page.
    pub async fn delete_task(&mut self, id: TaskId, confirm: &dyn Confirm) -> DeleteOutcome {
        let title = self
            .tasks()
            .iter()
            .find(|t| t.id == id)
            .map_or_else(|| format!("#{id}"), |t| t.title.clone());
        if !confirm.confirm(&delete_prompt(&title)).await {
            return DeleteOutcome::Cancelled;
        }
        match self.gateway.delete_task(id).await {
            Ok(()) => {
                info!(id, "task deleted");
                self.load().await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!(id, "delete failed: {e}");
                self.error = Some(DELETE_FAILED.to_string());
                DeleteOutcome::Failed
            }
        }
    }
}
