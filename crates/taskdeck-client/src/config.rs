use clap::{Args, Parser, Subcommand, ValueEnum};
use taskdeck_core::{PageSize, SortBy, SortDirection, TaskFilter, TaskId};

#[derive(Debug, Parser)]
#[command(name = "taskdeck", about = "Task tracker client")]
pub struct ClientConfig {
    /// Task service base URL
    #[arg(long, env = "TASKDECK_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    pub server_url: String,

    /// API key sent as a bearer token
    #[arg(long, env = "TASKDECK_API_KEY")]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tasks with filters, sorting and pagination
    List(ListArgs),
    /// Show a single task
    Show { id: TaskId },
    /// Create a task
    Create(CreateArgs),
    /// Edit a task; omitted flags keep their current value
    Edit {
        id: TaskId,
        #[command(flatten)]
        changes: EditArgs,
    },
    /// Flip a task between pending and completed
    Toggle { id: TaskId },
    /// Delete a task after confirmation
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusArg {
    pub fn is_completed(self) -> Option<bool> {
        match self {
            StatusArg::All => None,
            StatusArg::Pending => Some(false),
            StatusArg::Completed => Some(true),
        }
    }
}

fn parse_sort_by(s: &str) -> Result<SortBy, String> {
    SortBy::parse_str(s).ok_or_else(|| {
        let names: Vec<_> = SortBy::ALL.iter().map(SortBy::as_str).collect();
        format!("expected one of: {}", names.join(", "))
    })
}

fn parse_direction(s: &str) -> Result<SortDirection, String> {
    SortDirection::parse_str(s).ok_or_else(|| "expected asc or desc".to_string())
}

fn parse_page_size(s: &str) -> Result<PageSize, String> {
    s.parse::<u32>()
        .ok()
        .and_then(PageSize::from_u32)
        .ok_or_else(|| "page size must be 5, 10 or 25".to_string())
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, value_enum, default_value_t = StatusArg::All)]
    pub status: StatusArg,

    /// Due on or after, YYYY-MM-DDTHH:MM
    #[arg(long)]
    pub from: Option<String>,

    /// Due on or before, YYYY-MM-DDTHH:MM
    #[arg(long)]
    pub to: Option<String>,

    /// createdAt, title or dueDate
    #[arg(long, value_parser = parse_sort_by, default_value = "createdAt")]
    pub sort_by: SortBy,

    #[arg(long, value_parser = parse_direction, default_value = "asc")]
    pub direction: SortDirection,

    #[arg(long, value_parser = parse_page_size, default_value = "10")]
    pub size: PageSize,

    /// 1-based page number
    #[arg(long, default_value = "1")]
    pub page: u32,
}

impl ListArgs {
    /// Filter controls with the page converted to 0-based.
    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            is_completed: self.status.is_completed(),
            sort_by: self.sort_by,
            sort_direction: self.direction,
            size: self.size,
            page: self.page.saturating_sub(1),
            ..TaskFilter::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    /// YYYY-MM-DDTHH:MM
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(long)]
    pub title: Option<String>,

    /// Pass an empty string to clear
    #[arg(long)]
    pub description: Option<String>,

    /// YYYY-MM-DDTHH:MM; pass an empty string to clear
    #[arg(long)]
    pub due: Option<String>,

    #[arg(long)]
    pub completed: Option<bool>,
}
