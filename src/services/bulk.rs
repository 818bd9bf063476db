use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use crate::domain::{LargeOrder, LargeOrderDraft, LargeOrderStatus, User};
use crate::error::OrderError;
use crate::session::Session;
use crate::store::{paths, StoreClient, StoreError};

/// Quote-based bulk purchases. These never touch product inventory; the
/// admin prices them by hand later.
#[derive(Clone)]
pub struct BulkOrderService {
    store: StoreClient,
}

impl BulkOrderService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    #[instrument(fields(user_id = %session.user_id), skip_all)]
    pub async fn submit(
        &self,
        session: &Session,
        draft: LargeOrderDraft,
    ) -> Result<(String, LargeOrder), OrderError> {
        for (field, value) in [
            ("minecraft name", &draft.minecraft_name),
            ("contact info", &draft.contact_info),
            ("address", &draft.address),
            ("details", &draft.details),
        ] {
            if value.trim().is_empty() {
                return Err(OrderError::Validation(format!("{field} is required")));
            }
        }
        if !draft.requested_price.is_finite() || draft.requested_price <= 0.0 {
            return Err(OrderError::Validation(
                "requested price must be positive".into(),
            ));
        }

        let user: User = self
            .store
            .get_as(paths::user(&session.user_id))
            .await?
            .ok_or_else(|| {
                OrderError::Validation(format!("account not found: {}", session.user_id))
            })?;

        let mut order = LargeOrder {
            id: String::new(),
            user_uid: session.user_id.clone(),
            user_email: user.email,
            minecraft_name: draft.minecraft_name,
            contact_info: draft.contact_info,
            address: draft.address,
            details: draft.details,
            requested_price: draft.requested_price,
            status: LargeOrderStatus::Pending,
            final_price: None,
            rejection_reason: None,
            timestamp: Utc::now(),
        };
        let node = serde_json::to_value(&order).map_err(|e| StoreError::Malformed {
            path: paths::large_orders(),
            reason: e.to_string(),
        })?;

        let id = self.store.push(paths::large_orders(), node).await?;
        // Seed the chat thread the admin uses to negotiate the quote.
        self.store
            .set(
                paths::bulk_order_chat(&id),
                json!({"unreadAdmin": false, "unreadUser": false}),
            )
            .await?;

        order.id = id.clone();
        info!(order_id = %id, "Bulk order submitted");
        Ok((id, order))
    }
}
