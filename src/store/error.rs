use thiserror::Error;

use super::path::Path;

/// Errors produced by the store actor or its client handle.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("no node at {0}")]
    NotFound(Path),
    #[error("node at {0} is not an object")]
    NotAnObject(Path),
    #[error("node at {0} is not a number")]
    NotANumber(Path),
    #[error("guard failed at {path}: observed {observed}")]
    GuardFailed { path: Path, observed: f64 },
    #[error("malformed node at {path}: {reason}")]
    Malformed { path: Path, reason: String },
    #[error("store unavailable: {0}")]
    Closed(String),
}

impl StoreError {
    pub(crate) fn closed(context: &str) -> Self {
        StoreError::Closed(context.to_string())
    }
}
