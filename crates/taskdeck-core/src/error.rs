use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskdeckError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
