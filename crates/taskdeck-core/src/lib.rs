pub mod datetime;
pub mod error;
pub mod filter;
pub mod page;
pub mod task;

pub use error::TaskdeckError;
pub use filter::{PageSize, SortBy, SortDirection, TaskFilter};
pub use page::PagedResponse;
pub use task::{Task, TaskDraft, TaskId};
