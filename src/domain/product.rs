use serde::{Deserialize, Serialize};

/// A catalog entry. Field names mirror the stored node keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    pub stock: u32,
    /// Bundle contents for kit products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kit: Option<Vec<String>>,
}

impl Product {
    /// The price a buyer actually pays: the discount price when one is set
    /// and positive, the list price otherwise.
    pub fn effective_price(&self) -> f64 {
        match self.discount_price {
            Some(p) if p > 0.0 => p,
            _ => self.price,
        }
    }

    /// Which stored field `effective_price` came from, for commit-time
    /// price guards.
    pub fn priced_by_discount(&self) -> bool {
        matches!(self.discount_price, Some(p) if p > 0.0)
    }
}
