//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_get`] or [`expect_action`] to assert behavior,
//! or [`create_unreachable_client`] to simulate a store that is down.

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use tokio::sync::{mpsc, oneshot};

/// Creates a mock client and a receiver for asserting requests.
///
/// The client sends messages to a channel the test controls, so the test can
/// answer each request with success, failure or silence.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Creates a client whose actor is already gone. Every call fails with
/// [`FrameworkError::ActorClosed`].
pub fn create_unreachable_client<T: Entity>() -> ResourceClient<T> {
    let (client, receiver) = create_mock_client(1);
    drop(receiver);
    client
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Query request
pub async fn expect_query<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Filter, oneshot::Sender<Result<Vec<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Query { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, oneshot::Sender<Result<T::ActionResult, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::OrderClient;
    use crate::domain::{Order, OrderStatus};
    use chrono::Utc;

    #[tokio::test]
    async fn test_mock_client() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);

        let lookup = tokio::spawn(async move { client.get_order("order-1".to_string()).await });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, "order-1");
        let order = Order {
            order_id: "order-1".into(),
            buyer_address: "0xaaa".into(),
            product_id: "dataset-001".into(),
            tx_hash: "0x01".into(),
            amount_wei: "0".into(),
            chain_id: 1315,
            status: OrderStatus::Completed,
            verified_at: None,
            created_at: Utc::now(),
        };
        responder.send(Ok(Some(order))).unwrap();

        let found = lookup.await.unwrap().unwrap();
        assert_eq!(found.map(|o| o.product_id), Some("dataset-001".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_client() {
        let client = OrderClient::new(create_unreachable_client());
        let err = client.get_order("order-1".to_string()).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
