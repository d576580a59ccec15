mod http;
mod memory;
mod traits;

pub use http::{list_query, HttpService};
pub use memory::MemoryService;
pub use traits::{FieldErrors, ServiceError, TaskGateway};
