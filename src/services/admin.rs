use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::domain::{LargeOrder, LargeOrderStatus, Order, OrderStatus, Promotions, User};
use crate::error::AdminError;
use crate::session::Session;
use crate::store::{paths, StoreClient};

/// Back-office mutations. Every entry point first re-reads the caller's
/// account and requires live admin rank; the session is only a claim.
#[derive(Clone)]
pub struct AdminService {
    store: StoreClient,
}

impl AdminService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    async fn ensure_admin(&self, session: &Session) -> Result<(), AdminError> {
        let user: Option<User> = self.store.get_as(paths::user(&session.user_id)).await?;
        match user {
            Some(user) if user.is_admin() => Ok(()),
            _ => {
                warn!(user_id = %session.user_id, "Admin mutation refused");
                Err(AdminError::Forbidden(session.user_id.clone()))
            }
        }
    }

    // ------------------------------------------------------------------
    // Catalog orders
    // ------------------------------------------------------------------

    async fn load_order(&self, order_id: &str) -> Result<Order, AdminError> {
        self.store
            .get_as(paths::order(order_id))
            .await?
            .ok_or_else(|| AdminError::OrderNotFound(order_id.to_string()))
    }

    fn check_order_transition(from: OrderStatus, to: OrderStatus) -> Result<(), AdminError> {
        if from.can_transition_to(to) {
            Ok(())
        } else {
            Err(AdminError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// pending → shipped. Requires the fulfilling branch and stamps the
    /// shipping time.
    #[instrument(fields(admin = %session.user_id, order_id = %order_id), skip_all)]
    pub async fn ship_order(
        &self,
        session: &Session,
        order_id: &str,
        branch: &str,
    ) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        if branch.trim().is_empty() {
            return Err(AdminError::InvalidBranch(branch.to_string()));
        }
        let branches: Vec<String> = self
            .store
            .get_as(paths::branches())
            .await?
            .unwrap_or_default();
        if !branches.iter().any(|b| b == branch) {
            return Err(AdminError::InvalidBranch(branch.to_string()));
        }

        let order = self.load_order(order_id).await?;
        Self::check_order_transition(order.status, OrderStatus::Shipped)?;

        let mut fields = Map::new();
        fields.insert("status".into(), json!(OrderStatus::Shipped));
        fields.insert("shippingBranch".into(), Value::String(branch.to_string()));
        fields.insert("shippedAt".into(), json!(Utc::now()));
        self.store.update(paths::order(order_id), fields).await?;

        info!(branch = %branch, "Order shipped");
        Ok(())
    }

    /// shipped → delivered.
    #[instrument(fields(admin = %session.user_id, order_id = %order_id), skip_all)]
    pub async fn mark_delivered(&self, session: &Session, order_id: &str) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        let order = self.load_order(order_id).await?;
        Self::check_order_transition(order.status, OrderStatus::Delivered)?;

        let mut fields = Map::new();
        fields.insert("status".into(), json!(OrderStatus::Delivered));
        self.store.update(paths::order(order_id), fields).await?;

        info!("Order delivered");
        Ok(())
    }

    /// pending → rejected, with a reason for the buyer.
    #[instrument(fields(admin = %session.user_id, order_id = %order_id), skip_all)]
    pub async fn reject_order(
        &self,
        session: &Session,
        order_id: &str,
        reason: &str,
    ) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        if reason.trim().is_empty() {
            return Err(AdminError::MissingReason);
        }
        let order = self.load_order(order_id).await?;
        Self::check_order_transition(order.status, OrderStatus::Rejected)?;

        let mut fields = Map::new();
        fields.insert("status".into(), json!(OrderStatus::Rejected));
        fields.insert("rejectionReason".into(), Value::String(reason.to_string()));
        self.store.update(paths::order(order_id), fields).await?;

        info!("Order rejected");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bulk orders
    // ------------------------------------------------------------------

    async fn load_large_order(&self, order_id: &str) -> Result<LargeOrder, AdminError> {
        self.store
            .get_as(paths::large_order(order_id))
            .await?
            .ok_or_else(|| AdminError::OrderNotFound(order_id.to_string()))
    }

    /// Moves a bulk order along pending → processing → shipping → completed.
    /// Rejection goes through [`AdminService::reject_large_order`] so a
    /// reason is always attached.
    #[instrument(fields(admin = %session.user_id, order_id = %order_id, next = %next), skip_all)]
    pub async fn advance_large_order(
        &self,
        session: &Session,
        order_id: &str,
        next: LargeOrderStatus,
    ) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        if next == LargeOrderStatus::Rejected {
            return Err(AdminError::MissingReason);
        }
        let order = self.load_large_order(order_id).await?;
        if !order.status.can_transition_to(next) {
            return Err(AdminError::InvalidTransition {
                from: order.status.to_string(),
                to: next.to_string(),
            });
        }

        let mut fields = Map::new();
        fields.insert("status".into(), json!(next));
        self.store.update(paths::large_order(order_id), fields).await?;

        info!("Bulk order advanced");
        Ok(())
    }

    #[instrument(fields(admin = %session.user_id, order_id = %order_id), skip_all)]
    pub async fn reject_large_order(
        &self,
        session: &Session,
        order_id: &str,
        reason: &str,
    ) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        if reason.trim().is_empty() {
            return Err(AdminError::MissingReason);
        }
        let order = self.load_large_order(order_id).await?;
        if !order.status.can_transition_to(LargeOrderStatus::Rejected) {
            return Err(AdminError::InvalidTransition {
                from: order.status.to_string(),
                to: LargeOrderStatus::Rejected.to_string(),
            });
        }

        let mut fields = Map::new();
        fields.insert("status".into(), json!(LargeOrderStatus::Rejected));
        fields.insert("rejectionReason".into(), Value::String(reason.to_string()));
        self.store.update(paths::large_order(order_id), fields).await?;

        info!("Bulk order rejected");
        Ok(())
    }

    /// The negotiated price. Settable any time before the order reaches a
    /// terminal state.
    #[instrument(fields(admin = %session.user_id, order_id = %order_id), skip_all)]
    pub async fn set_final_price(
        &self,
        session: &Session,
        order_id: &str,
        price: f64,
    ) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        if !price.is_finite() || price <= 0.0 {
            return Err(AdminError::InvalidPrice(price));
        }
        let order = self.load_large_order(order_id).await?;
        if order.status.is_terminal() {
            return Err(AdminError::InvalidTransition {
                from: order.status.to_string(),
                to: order.status.to_string(),
            });
        }

        let mut fields = Map::new();
        fields.insert("finalPrice".into(), json!(price));
        self.store.update(paths::large_order(order_id), fields).await?;

        info!(price, "Final price set");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Users, inventory, promotions, branches
    // ------------------------------------------------------------------

    #[instrument(fields(admin = %session.user_id, user_id = %user_id), skip_all)]
    pub async fn approve_user(&self, session: &Session, user_id: &str) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        if self.store.get(paths::user(user_id)).await?.is_none() {
            return Err(AdminError::UserNotFound(user_id.to_string()));
        }
        let mut fields = Map::new();
        fields.insert("approved".into(), Value::Bool(true));
        self.store.update(paths::user(user_id), fields).await?;

        info!("User approved");
        Ok(())
    }

    #[instrument(fields(admin = %session.user_id, user_id = %user_id), skip_all)]
    pub async fn delete_user(&self, session: &Session, user_id: &str) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        if self.store.get(paths::user(user_id)).await?.is_none() {
            return Err(AdminError::UserNotFound(user_id.to_string()));
        }
        self.store.remove(paths::user(user_id)).await?;

        info!("User deleted");
        Ok(())
    }

    #[instrument(fields(admin = %session.user_id, product_id = %product_id, stock), skip_all)]
    pub async fn set_stock(
        &self,
        session: &Session,
        product_id: &str,
        stock: u32,
    ) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        if self.store.get(paths::product(product_id)).await?.is_none() {
            return Err(AdminError::ProductNotFound(product_id.to_string()));
        }
        let mut fields = Map::new();
        fields.insert("stock".into(), json!(stock));
        self.store.update(paths::product(product_id), fields).await?;

        info!("Stock updated");
        Ok(())
    }

    #[instrument(fields(admin = %session.user_id), skip_all)]
    pub async fn set_promotions(
        &self,
        session: &Session,
        promotions: Promotions,
    ) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        self.store
            .set_from(paths::promotions(), &promotions.clamped())
            .await?;

        info!("Promotions updated");
        Ok(())
    }

    #[instrument(fields(admin = %session.user_id, branch = %name), skip_all)]
    pub async fn add_branch(&self, session: &Session, name: &str) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AdminError::InvalidBranch(name.to_string()));
        }
        let mut branches: Vec<String> = self
            .store
            .get_as(paths::branches())
            .await?
            .unwrap_or_default();
        branches.push(name.to_string());
        self.store.set_from(paths::branches(), &branches).await?;

        info!("Branch added");
        Ok(())
    }

    #[instrument(fields(admin = %session.user_id, branch = %name), skip_all)]
    pub async fn remove_branch(&self, session: &Session, name: &str) -> Result<(), AdminError> {
        self.ensure_admin(session).await?;

        let mut branches: Vec<String> = self
            .store
            .get_as(paths::branches())
            .await?
            .unwrap_or_default();
        branches.retain(|b| b != name);
        self.store.set_from(paths::branches(), &branches).await?;

        info!("Branch removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rank;
    use crate::store::StoreActor;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    async fn service_with_admin() -> (AdminService, Session, Session) {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("id_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, store) = StoreActor::new(16, next_id);
        tokio::spawn(actor.run());
        let admin = AdminService::new(store);

        let mut manager = User::new("manager", "m@example.com", "pw1234");
        manager.approved = true;
        manager.rank = Rank::Admin;
        admin
            .store
            .set_from(paths::user("manager"), &manager)
            .await
            .unwrap();
        manager.id = "manager".into();

        let mut member = User::new("mallory", "mal@example.com", "pw1234");
        member.approved = true;
        admin
            .store
            .set_from(paths::user("mallory"), &member)
            .await
            .unwrap();
        member.id = "mallory".into();

        (admin, Session::issue(&manager), Session::issue(&member))
    }

    #[tokio::test]
    async fn member_sessions_are_refused_everywhere() {
        let (admin, _, member) = service_with_admin().await;
        assert!(matches!(
            admin.approve_user(&member, "mallory").await,
            Err(AdminError::Forbidden(_))
        ));
        assert!(matches!(
            admin.add_branch(&member, "North Station").await,
            Err(AdminError::Forbidden(_))
        ));
        assert!(matches!(
            admin.set_promotions(&member, Promotions::default()).await,
            Err(AdminError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn an_admin_claim_is_rechecked_against_the_live_record() {
        let (admin, manager, _) = service_with_admin().await;

        // The account is demoted after the session was issued.
        let mut fields = Map::new();
        fields.insert("rank".into(), json!(Rank::Member));
        admin
            .store
            .update(paths::user("manager"), fields)
            .await
            .unwrap();

        assert!(matches!(
            admin.approve_user(&manager, "mallory").await,
            Err(AdminError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn user_management_round_trip() {
        let (admin, manager, _) = service_with_admin().await;

        admin.approve_user(&manager, "mallory").await.unwrap();
        let user: User = admin
            .store
            .get_as(paths::user("mallory"))
            .await
            .unwrap()
            .unwrap();
        assert!(user.approved);

        admin.delete_user(&manager, "mallory").await.unwrap();
        assert!(admin.store.get(paths::user("mallory")).await.unwrap().is_none());

        assert!(matches!(
            admin.approve_user(&manager, "mallory").await,
            Err(AdminError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn stock_edits_require_an_existing_product() {
        let (admin, manager, _) = service_with_admin().await;
        assert!(matches!(
            admin.set_stock(&manager, "Diamond", 5).await,
            Err(AdminError::ProductNotFound(_))
        ));

        admin
            .store
            .set(paths::product("Diamond"), json!({"name": "Diamond", "stock": 1}))
            .await
            .unwrap();
        admin.set_stock(&manager, "Diamond", 5).await.unwrap();
        assert_eq!(
            admin.store.get(paths::product_stock("Diamond")).await.unwrap(),
            Some(json!(5))
        );
    }

    #[tokio::test]
    async fn promotions_are_clamped_on_write() {
        let (admin, manager, _) = service_with_admin().await;
        admin
            .set_promotions(
                &manager,
                Promotions {
                    free_shipping: false,
                    discount_percentage: 400,
                    points_boost: 9999,
                },
            )
            .await
            .unwrap();

        let stored: Promotions = admin
            .store
            .get_as(paths::promotions())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.discount_percentage, 100);
        assert_eq!(stored.points_boost, 1000);
    }

    #[tokio::test]
    async fn branch_list_edits() {
        let (admin, manager, _) = service_with_admin().await;

        assert!(matches!(
            admin.add_branch(&manager, "   ").await,
            Err(AdminError::InvalidBranch(_))
        ));

        admin.add_branch(&manager, "North Station").await.unwrap();
        admin.add_branch(&manager, " South Gate ").await.unwrap();
        let branches: Vec<String> = admin
            .store
            .get_as(paths::branches())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(branches, vec!["North Station", "South Gate"]);

        admin.remove_branch(&manager, "North Station").await.unwrap();
        let branches: Vec<String> = admin
            .store
            .get_as(paths::branches())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(branches, vec!["South Gate"]);
    }
}
