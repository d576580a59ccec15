//! Create/edit form state, client-side validation and submission.
//!
//! Validation is table driven: `RULES` lists the checks for each field and
//! `FormController::client_errors` evaluates them on demand. A field only
//! shows its errors once it has been touched, edited, or a submit was tried.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use taskdeck_core::datetime;
use taskdeck_core::task::TITLE_MAX_CHARS;
use taskdeck_core::{Task, TaskDraft, TaskId};
use taskdeck_service::{ServiceError, TaskGateway};
use tracing::{debug, info, warn};

pub const LOAD_FAILED: &str = "Failed to load task.";
pub const SAVE_FAILED: &str = "Failed to save task. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    DueDate,
    IsCompleted,
}

impl Field {
    pub const ALL: &[Field] = &[
        Field::Title,
        Field::Description,
        Field::DueDate,
        Field::IsCompleted,
    ];

    /// Name used by the service in field-error maps.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::DueDate => "dueDate",
            Field::IsCompleted => "isCompleted",
        }
    }

    pub fn parse_wire(s: &str) -> Option<Self> {
        match s {
            "title" => Some(Field::Title),
            "description" => Some(Field::Description),
            "dueDate" => Some(Field::DueDate),
            "isCompleted" => Some(Field::IsCompleted),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::DueDate => "Due date",
            Field::IsCompleted => "Completed",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-blank.
    Required,
    /// At most this many characters.
    MaxChars(usize),
    /// Blank, or a parseable date-time.
    DateTime,
}

pub const RULES: &[(Field, &[Rule])] = &[
    (Field::Title, &[Rule::Required, Rule::MaxChars(TITLE_MAX_CHARS)]),
    (Field::DueDate, &[Rule::DateTime]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required,
    TooLong { max: usize },
    InvalidDateTime,
    /// Annotation from a server-side rejection.
    Server(String),
}

impl FieldError {
    pub fn message(&self, field: Field) -> String {
        match self {
            FieldError::Required => format!("{field} is required."),
            FieldError::TooLong { max } => format!("{field} must not exceed {max} characters."),
            FieldError::InvalidDateTime => format!("{field} must be a valid date and time."),
            FieldError::Server(msg) => msg.clone(),
        }
    }
}

impl Rule {
    fn check(&self, value: &str) -> Option<FieldError> {
        match self {
            Rule::Required if value.trim().is_empty() => Some(FieldError::Required),
            Rule::MaxChars(max) if value.chars().count() > *max => {
                Some(FieldError::TooLong { max: *max })
            }
            Rule::DateTime if datetime::parse_input(value).is_err() => {
                Some(FieldError::InvalidDateTime)
            }
            _ => None,
        }
    }
}

/// Raw input values, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DDTHH:MM`, or empty.
    pub due_date: String,
    pub is_completed: bool,
}

impl FormValues {
    fn text(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::DueDate => &self.due_date,
            Field::IsCompleted => "",
        }
    }

    fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task
                .due_date
                .as_ref()
                .map(datetime::to_input)
                .unwrap_or_default(),
            is_completed: task.is_completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FieldFlags {
    touched: bool,
    dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TaskId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Client rules failed. Nothing was sent.
    Invalid,
    /// A submit is already in flight.
    Busy,
    /// Navigate to the detail view of the returned task.
    Saved(Task),
    /// The server rejected the save. See `server_error` and field errors.
    Failed,
}

pub struct FormController {
    gateway: Arc<dyn TaskGateway>,
    mode: FormMode,
    values: FormValues,
    flags: BTreeMap<Field, FieldFlags>,
    server_errors: BTreeMap<Field, String>,
    submitting: bool,
    server_error: Option<String>,
}

impl FormController {
    pub fn create(gateway: Arc<dyn TaskGateway>) -> Self {
        Self {
            gateway,
            mode: FormMode::Create,
            values: FormValues::default(),
            flags: BTreeMap::new(),
            server_errors: BTreeMap::new(),
            submitting: false,
            server_error: None,
        }
    }

    /// Open the form for an existing task and prefill it from the server.
    pub async fn edit(gateway: Arc<dyn TaskGateway>, id: TaskId) -> Self {
        let mut form = Self::create(gateway);
        form.mode = FormMode::Edit(id);
        match form.gateway.get_task(id).await {
            Ok(task) => form.patch(&task),
            Err(e) => {
                warn!(id, "prefetch failed: {e}");
                form.server_error = Some(LOAD_FAILED.to_string());
            }
        }
        form
    }

    /// Replace the values without marking anything as edited.
    pub fn patch(&mut self, task: &Task) {
        self.values = FormValues::from_task(task);
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn server_error(&self) -> Option<&str> {
        self.server_error.as_deref()
    }

    fn edited(&mut self, field: Field) {
        self.flags.entry(field).or_default().dirty = true;
        self.server_errors.remove(&field);
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.values.title = value.into();
        self.edited(Field::Title);
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.values.description = value.into();
        self.edited(Field::Description);
    }

    pub fn set_due_date(&mut self, value: impl Into<String>) {
        self.values.due_date = value.into();
        self.edited(Field::DueDate);
    }

    /// Only editable in edit mode; new tasks always start pending.
    pub fn set_is_completed(&mut self, value: bool) {
        if !self.is_edit() {
            debug!("ignoring completion change on a new task");
            return;
        }
        self.values.is_completed = value;
        self.edited(Field::IsCompleted);
    }

    /// The field lost focus.
    pub fn touch(&mut self, field: Field) {
        self.flags.entry(field).or_default().touched = true;
    }

    pub fn mark_all_touched(&mut self) {
        for field in Field::ALL {
            self.touch(*field);
        }
    }

    pub fn client_errors(&self, field: Field) -> Vec<FieldError> {
        let value = self.values.text(field);
        RULES
            .iter()
            .filter(|(f, _)| *f == field)
            .flat_map(|(_, rules)| rules.iter())
            .filter_map(|rule| rule.check(value))
            .collect()
    }

    /// Client errors followed by any server annotation.
    pub fn errors(&self, field: Field) -> Vec<FieldError> {
        let mut errors = self.client_errors(field);
        if let Some(msg) = self.server_errors.get(&field) {
            errors.push(FieldError::Server(msg.clone()));
        }
        errors
    }

    pub fn is_valid(&self) -> bool {
        Field::ALL.iter().all(|f| self.errors(*f).is_empty())
    }

    /// Whether the field should be drawn as invalid right now.
    pub fn is_field_invalid(&self, field: Field) -> bool {
        let flags = self.flags.get(&field).copied().unwrap_or_default();
        (flags.touched || flags.dirty) && !self.errors(field).is_empty()
    }

    /// Messages to show under a field; empty until it is invalid for display.
    pub fn visible_errors(&self, field: Field) -> Vec<String> {
        if !self.is_field_invalid(field) {
            return Vec::new();
        }
        self.errors(field)
            .iter()
            .map(|e| e.message(field))
            .collect()
    }

    /// Build the payload from the current values.
    pub fn draft(&self) -> Option<TaskDraft> {
        let due_date = datetime::parse_input(&self.values.due_date).ok()?;
        let description = Some(self.values.description.clone()).filter(|d| !d.is_empty());
        Some(TaskDraft {
            title: self.values.title.clone(),
            description,
            is_completed: self.is_edit() && self.values.is_completed,
            due_date,
        })
    }

    /// Validate and send.
    ///
    /// On success `submitting` stays set; the caller is expected to move on
    /// to the saved task.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.submitting {
            return SubmitOutcome::Busy;
        }
        let draft = match self.draft() {
            Some(draft) if self.is_valid() => draft,
            _ => {
                self.mark_all_touched();
                return SubmitOutcome::Invalid;
            }
        };

        self.submitting = true;
        self.server_error = None;
        let result = match self.mode {
            FormMode::Create => self.gateway.create_task(&draft).await,
            FormMode::Edit(id) => self.gateway.update_task(id, &draft).await,
        };
        match result {
            Ok(task) => {
                info!(id = task.id, "task saved");
                SubmitOutcome::Saved(task)
            }
            Err(e) => {
                self.submitting = false;
                self.apply_failure(&e);
                SubmitOutcome::Failed
            }
        }
    }

    /// Completion has no input on a new task.
    fn is_editable(&self, field: Field) -> bool {
        field != Field::IsCompleted || self.is_edit()
    }

    /// Annotate editable fields. Messages for fields the user cannot change
    /// go to the banner so they never block a retry.
    fn apply_failure(&mut self, e: &ServiceError) {
        warn!("save failed: {e}");
        let mut annotated = false;
        let mut unplaced = Vec::new();
        for (name, msg) in e.field_errors().into_iter().flatten() {
            match Field::parse_wire(name) {
                Some(field) if self.is_editable(field) => {
                    self.server_errors.insert(field, msg.clone());
                    self.touch(field);
                    annotated = true;
                }
                Some(field) => {
                    debug!(%field, "server rejected a field that is not editable here");
                    unplaced.push(msg.as_str());
                }
                None => warn!(field = %name, "server rejected a field the form does not have"),
            }
        }
        if !unplaced.is_empty() {
            self.server_error = Some(unplaced.join(" "));
        } else if !annotated {
            self.server_error = Some(e.server_message().unwrap_or(SAVE_FAILED).to_string());
        }
    }
}
