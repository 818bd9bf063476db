use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use crate::domain::{LargeOrder, Order, TrackedOrder};
use crate::error::OrderError;
use crate::session::Session;
use crate::store::{paths, StoreClient};

/// Order history and by-id lookup. Ownership is checked here, against the
/// stored record, so a client cannot see someone else's order by guessing
/// ids.
#[derive(Clone)]
pub struct TrackingService {
    store: StoreClient,
}

impl TrackingService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// Both order kinds merged, newest first.
    #[instrument(fields(user_id = %session.user_id), skip_all)]
    pub async fn my_orders(&self, session: &Session) -> Result<Vec<TrackedOrder>, OrderError> {
        let orders: BTreeMap<String, Order> = self
            .store
            .get_as(paths::orders())
            .await?
            .unwrap_or_default();
        let large_orders: BTreeMap<String, LargeOrder> = self
            .store
            .get_as(paths::large_orders())
            .await?
            .unwrap_or_default();

        let mut tracked: Vec<TrackedOrder> = Vec::new();
        for (id, mut order) in orders {
            if order.user_uid == session.user_id {
                order.id = id;
                tracked.push(TrackedOrder::Regular(order));
            }
        }
        for (id, mut order) in large_orders {
            if order.user_uid == session.user_id {
                order.id = id;
                tracked.push(TrackedOrder::Bulk(order));
            }
        }
        tracked.sort_by_key(|order| std::cmp::Reverse(order.timestamp()));

        debug!(count = tracked.len(), "Order history loaded");
        Ok(tracked)
    }

    /// Looks an id up in both collections. Someone else's order reads as
    /// denied, a missing one as not found; both leave the caller empty-handed.
    #[instrument(fields(user_id = %session.user_id, order_id = %id), skip_all)]
    pub async fn find_order(&self, session: &Session, id: &str) -> Result<TrackedOrder, OrderError> {
        if let Some(mut order) = self.store.get_as::<Order>(paths::order(id)).await? {
            if order.user_uid != session.user_id {
                info!("Order belongs to another user");
                return Err(OrderError::AccessDenied(id.to_string()));
            }
            order.id = id.to_string();
            return Ok(TrackedOrder::Regular(order));
        }

        if let Some(mut order) = self.store.get_as::<LargeOrder>(paths::large_order(id)).await? {
            if order.user_uid != session.user_id {
                info!("Order belongs to another user");
                return Err(OrderError::AccessDenied(id.to_string()));
            }
            order.id = id.to_string();
            return Ok(TrackedOrder::Bulk(order));
        }

        Err(OrderError::NotFound(id.to_string()))
    }
}
