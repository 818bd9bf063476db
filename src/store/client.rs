use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use super::error::StoreError;
use super::msg::{StoreRequest, StoreResult};
use super::path::Path;
use super::tx::Transaction;

/// Cloneable handle to the store actor. Thin wrapper around the message
/// channel; every method is one request/response round trip.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, path: Path) -> StoreResult<Option<Value>> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(StoreRequest::Get { path, respond_to }, response).await
    }

    /// Reads the node at `path` and deserializes it, treating a malformed
    /// node as a store-boundary error rather than a caller concern.
    pub async fn get_as<T: DeserializeOwned>(&self, path: Path) -> StoreResult<Option<T>> {
        match self.get(path.clone()).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::Malformed {
                    path,
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, value))]
    pub async fn set(&self, path: Path, value: Value) -> StoreResult<()> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(
            StoreRequest::Set {
                path,
                value,
                respond_to,
            },
            response,
        )
        .await
    }

    pub async fn set_from<T: Serialize>(&self, path: Path, value: &T) -> StoreResult<()> {
        let value = serde_json::to_value(value).map_err(|e| StoreError::Malformed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        self.set(path, value).await
    }

    #[instrument(skip(self, fields))]
    pub async fn update(&self, path: Path, fields: Map<String, Value>) -> StoreResult<()> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(
            StoreRequest::Update {
                path,
                fields,
                respond_to,
            },
            response,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, path: Path) -> StoreResult<()> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(StoreRequest::Remove { path, respond_to }, response).await
    }

    #[instrument(skip(self, value))]
    pub async fn push(&self, path: Path, value: Value) -> StoreResult<String> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(
            StoreRequest::Push {
                path,
                value,
                respond_to,
            },
            response,
        )
        .await
    }

    #[instrument(skip(self, tx))]
    pub async fn commit(&self, tx: Transaction) -> StoreResult<String> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(StoreRequest::Commit { tx, respond_to }, response).await
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> StoreResult<()> {
        debug!("Sending shutdown request");
        self.sender
            .send(StoreRequest::Shutdown)
            .await
            .map_err(|_| StoreError::closed("actor closed"))
    }

    async fn send<T>(
        &self,
        request: StoreRequest,
        response: oneshot::Receiver<StoreResult<T>>,
    ) -> StoreResult<T> {
        self.sender
            .send(request)
            .await
            .map_err(|_| StoreError::closed("actor closed"))?;
        response
            .await
            .map_err(|_| StoreError::closed("actor dropped"))?
    }
}
