use serde_json::{Map, Value};
use tokio::sync::oneshot;

use super::error::StoreError;
use super::path::Path;
use super::tx::Transaction;

pub type StoreResult<T> = Result<T, StoreError>;
pub type Response<T> = oneshot::Sender<StoreResult<T>>;

/// Typed messages for the store actor. Each variant carries its parameters
/// and a oneshot channel for the response.
#[derive(Debug)]
pub enum StoreRequest {
    Get {
        path: Path,
        respond_to: Response<Option<Value>>,
    },
    Set {
        path: Path,
        value: Value,
        respond_to: Response<()>,
    },
    Update {
        path: Path,
        fields: Map<String, Value>,
        respond_to: Response<()>,
    },
    Remove {
        path: Path,
        respond_to: Response<()>,
    },
    Push {
        path: Path,
        value: Value,
        respond_to: Response<String>,
    },
    Commit {
        tx: Transaction,
        respond_to: Response<String>,
    },
    Shutdown,
}
