use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::client::StoreClient;
use super::error::StoreError;
use super::msg::{Response, StoreRequest, StoreResult};
use super::path::Path;
use super::tree;
use super::tx::Transaction;

/// The store actor owns the whole tree. Every read and mutation arrives as a
/// message, so effects from different clients never interleave — which is
/// what makes [`Transaction`] commits all-or-nothing.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    root: Value,
    next_id_fn: Box<dyn Fn() -> String + Send + Sync>,
}

impl StoreActor {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> String + Send + Sync + 'static,
    ) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            root: Value::Object(Map::new()),
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, StoreClient::new(sender))
    }

    #[instrument(name = "store", skip(self))]
    pub async fn run(mut self) {
        info!("StoreActor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Get { path, respond_to } => {
                    self.handle_get(path, respond_to);
                }
                StoreRequest::Set {
                    path,
                    value,
                    respond_to,
                } => {
                    self.handle_set(path, value, respond_to);
                }
                StoreRequest::Update {
                    path,
                    fields,
                    respond_to,
                } => {
                    self.handle_update(path, fields, respond_to);
                }
                StoreRequest::Remove { path, respond_to } => {
                    self.handle_remove(path, respond_to);
                }
                StoreRequest::Push {
                    path,
                    value,
                    respond_to,
                } => {
                    self.handle_push(path, value, respond_to);
                }
                StoreRequest::Commit { tx, respond_to } => {
                    self.handle_commit(tx, respond_to);
                }
                StoreRequest::Shutdown => {
                    info!("StoreActor shutting down");
                    break;
                }
            }
        }

        info!("StoreActor stopped");
    }

    #[instrument(fields(path = %path), skip(self, respond_to))]
    fn handle_get(&self, path: Path, respond_to: Response<Option<Value>>) {
        debug!("Processing get request");
        let node = tree::get(&self.root, &path).cloned();
        let _ = respond_to.send(Ok(node));
    }

    #[instrument(fields(path = %path), skip(self, value, respond_to))]
    fn handle_set(&mut self, path: Path, value: Value, respond_to: Response<()>) {
        debug!("Processing set request");
        let _ = respond_to.send(tree::set(&mut self.root, &path, value));
    }

    #[instrument(fields(path = %path), skip(self, fields, respond_to))]
    fn handle_update(
        &mut self,
        path: Path,
        fields: Map<String, Value>,
        respond_to: Response<()>,
    ) {
        debug!(field_count = fields.len(), "Processing update request");
        let _ = respond_to.send(tree::merge(&mut self.root, &path, fields));
    }

    #[instrument(fields(path = %path), skip(self, respond_to))]
    fn handle_remove(&mut self, path: Path, respond_to: Response<()>) {
        debug!("Processing remove request");
        let _ = respond_to.send(tree::remove(&mut self.root, &path));
    }

    #[instrument(fields(path = %path), skip(self, value, respond_to))]
    fn handle_push(&mut self, path: Path, value: Value, respond_to: Response<String>) {
        debug!("Processing push request");
        let id = (self.next_id_fn)();
        let result = tree::set(&mut self.root, &path.child(id.clone()), value);
        let _ = respond_to.send(result.map(|()| id));
    }

    #[instrument(fields(guards = tx.guards.len(), adjustments = tx.adjustments.len()), skip(self, tx, respond_to))]
    fn handle_commit(&mut self, tx: Transaction, respond_to: Response<String>) {
        debug!("Processing commit request");
        let result = self.apply_commit(tx);
        match &result {
            Ok(id) => info!(id = %id, "Commit applied"),
            Err(e) => warn!(error = %e, "Commit refused"),
        }
        let _ = respond_to.send(result);
    }

    /// Validates every guard and adjustment target, then applies the create
    /// and adjustments. Nothing is written unless validation passed, and the
    /// adjustments cannot fail once their targets are known to be numeric.
    fn apply_commit(&mut self, tx: Transaction) -> StoreResult<String> {
        for guard in &tx.guards {
            let observed = tree::number_at(&self.root, &guard.path)?;
            if !guard.holds(observed) {
                return Err(StoreError::GuardFailed {
                    path: guard.path.clone(),
                    observed,
                });
            }
        }
        for adjust in &tx.adjustments {
            tree::number_at(&self.root, &adjust.path)?;
        }

        let (parent, value) = tx.create;
        let id = (self.next_id_fn)();
        tree::set(&mut self.root, &parent.child(id.clone()), value)?;
        for adjust in &tx.adjustments {
            tree::add_number(&mut self.root, &adjust.path, adjust.delta)?;
        }
        Ok(id)
    }
}
