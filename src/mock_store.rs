//! Utilities for testing services in isolation.
//!
//! Instead of spinning up a real [`StoreActor`](crate::store::StoreActor),
//! tests can take the receiver side of a [`StoreClient`]'s channel, assert
//! on the requests a service sends, and script the responses — success,
//! failure, or stale data — deterministically.

use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::store::{Path, Response, StoreClient, StoreRequest, Transaction};

pub fn create_mock_store(buffer_size: usize) -> (StoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Asserts the next request is a `Get` and hands back its responder.
pub async fn expect_get(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Path, Response<Option<Value>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Get { path, respond_to }) => Some((path, respond_to)),
        _ => None,
    }
}

pub async fn expect_update(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Path, Map<String, Value>, Response<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::Update {
            path,
            fields,
            respond_to,
        }) => Some((path, fields, respond_to)),
        _ => None,
    }
}

pub async fn expect_set(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Path, Value, Response<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::Set {
            path,
            value,
            respond_to,
        }) => Some((path, value, respond_to)),
        _ => None,
    }
}

pub async fn expect_push(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Path, Value, Response<String>)> {
    match receiver.recv().await {
        Some(StoreRequest::Push {
            path,
            value,
            respond_to,
        }) => Some((path, value, respond_to)),
        _ => None,
    }
}

pub async fn expect_commit(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Transaction, Response<String>)> {
    match receiver.recv().await {
        Some(StoreRequest::Commit { tx, respond_to }) => Some((tx, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::paths;
    use serde_json::json;

    #[tokio::test]
    async fn mock_client_round_trips_a_get() {
        let (client, mut receiver) = create_mock_store(8);

        let get_task = tokio::spawn(async move { client.get(paths::promotions()).await });

        let (path, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(path, paths::promotions());
        responder.send(Ok(Some(json!({"free_shipping": true})))).unwrap();

        let result = get_task.await.unwrap().unwrap();
        assert_eq!(result, Some(json!({"free_shipping": true})));
    }
}
