use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Normal,
    Express,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash (coal) on delivery.
    Cod,
    Points,
}

/// Lifecycle of a catalog order. Admin-only transitions; `delivered` and
/// `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Rejected,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Rejected)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Shipped) | (Pending, Rejected) | (Shipped, Delivered)
        )
    }
}

/// One line of a committed order, priced at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub total: f64,
}

/// A committed catalog order (`orders/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(skip)]
    pub id: String,
    pub user_uid: String,
    #[serde(default)]
    pub user_email: String,
    pub items: BTreeMap<String, OrderItem>,
    pub subtotal: f64,
    pub discount: f64,
    pub shipping_fee: f64,
    pub points_used: u32,
    pub points_earned: u32,
    pub total: f64,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub branch: String,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Order {
    /// Expected arrival once shipped: next day for express, three days out
    /// otherwise.
    pub fn estimated_delivery(&self) -> Option<DateTime<Utc>> {
        let shipped_at = self.shipped_at?;
        let days = match self.delivery_method {
            DeliveryMethod::Express => 1,
            DeliveryMethod::Normal => 3,
        };
        Some(shipped_at + Duration::days(days))
    }
}

/// Lifecycle of a quote-based bulk order. Rejection is only possible while
/// the quote is still pending; `completed` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LargeOrderStatus {
    Pending,
    Processing,
    Shipping,
    Completed,
    Rejected,
}

impl std::fmt::Display for LargeOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LargeOrderStatus::Pending => "pending",
            LargeOrderStatus::Processing => "processing",
            LargeOrderStatus::Shipping => "shipping",
            LargeOrderStatus::Completed => "completed",
            LargeOrderStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl LargeOrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LargeOrderStatus::Completed | LargeOrderStatus::Rejected
        )
    }

    pub fn can_transition_to(self, next: LargeOrderStatus) -> bool {
        use LargeOrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Processing, Shipping) | (Shipping, Completed) | (Pending, Rejected)
        )
    }
}

/// A quote-based bulk purchase request (`largeOrders/{id}`). Free-form; the
/// admin prices it manually and it never touches product inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeOrder {
    #[serde(skip)]
    pub id: String,
    pub user_uid: String,
    #[serde(default)]
    pub user_email: String,
    pub minecraft_name: String,
    pub contact_info: String,
    pub address: String,
    pub details: String,
    pub requested_price: f64,
    pub status: LargeOrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Submission payload for a bulk order.
#[derive(Debug, Clone)]
pub struct LargeOrderDraft {
    pub minecraft_name: String,
    pub contact_info: String,
    pub address: String,
    pub details: String,
    pub requested_price: f64,
}

/// The two order kinds, unified only where a user looks at their history.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackedOrder {
    Regular(Order),
    Bulk(LargeOrder),
}

impl TrackedOrder {
    pub fn id(&self) -> &str {
        match self {
            TrackedOrder::Regular(o) => &o.id,
            TrackedOrder::Bulk(o) => &o.id,
        }
    }

    pub fn owner(&self) -> &str {
        match self {
            TrackedOrder::Regular(o) => &o.user_uid,
            TrackedOrder::Bulk(o) => &o.user_uid,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TrackedOrder::Regular(o) => o.timestamp,
            TrackedOrder::Bulk(o) => o.timestamp,
        }
    }

    /// Delivery progress as a percentage plus a short label.
    pub fn progress(&self) -> (u8, &'static str) {
        match self {
            TrackedOrder::Regular(o) => match o.status {
                OrderStatus::Pending => (25, "order under review"),
                OrderStatus::Shipped => (75, "shipped"),
                OrderStatus::Delivered => (100, "delivered"),
                OrderStatus::Rejected => (0, "rejected"),
            },
            TrackedOrder::Bulk(o) => match o.status {
                LargeOrderStatus::Pending => (20, "quote under review"),
                LargeOrderStatus::Processing => (40, "preparing"),
                LargeOrderStatus::Shipping => (80, "in transit"),
                LargeOrderStatus::Completed => (100, "delivered"),
                LargeOrderStatus::Rejected => (0, "rejected"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_transitions_follow_the_state_machine() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Shipped));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Shipped.can_transition_to(Delivered));

        assert!(!Shipped.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Shipped));
        assert!(!Rejected.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Delivered));
    }

    #[test]
    fn large_order_rejection_only_from_pending() {
        use LargeOrderStatus::*;
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Processing.can_transition_to(Rejected));
        assert!(!Shipping.can_transition_to(Rejected));

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipping));
        assert!(Shipping.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Shipping));
    }

    #[test]
    fn express_delivery_estimate_is_next_day() {
        let shipped = Utc::now();
        let order = Order {
            id: "o1".into(),
            user_uid: "alice".into(),
            user_email: String::new(),
            items: BTreeMap::new(),
            subtotal: 6.0,
            discount: 0.0,
            shipping_fee: 0.5,
            points_used: 0,
            points_earned: 0,
            total: 7.0,
            delivery_method: DeliveryMethod::Express,
            payment_method: PaymentMethod::Cod,
            branch: "north".into(),
            status: OrderStatus::Shipped,
            timestamp: shipped,
            shipping_branch: Some("north".into()),
            shipped_at: Some(shipped),
            rejection_reason: None,
        };
        assert_eq!(order.estimated_delivery(), Some(shipped + Duration::days(1)));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(OrderStatus::Pending).unwrap(), "pending");
        assert_eq!(
            serde_json::to_value(LargeOrderStatus::Processing).unwrap(),
            "processing"
        );
    }
}
