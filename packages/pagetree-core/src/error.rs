use thiserror::Error;

use crate::ids::ElementId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed answers: {0}")]
    MalformedAnswers(String),
    #[error("cycle detected through element {0}")]
    CycleDetected(ElementId),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
