use serde::{Deserialize, Serialize};

/// Global, admin-configured checkout modifiers (`promotions` singleton).
/// This node predates the rest of the tree and keeps its snake_case keys.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Promotions {
    #[serde(default)]
    pub free_shipping: bool,
    /// Storewide discount, percent of the subtotal.
    #[serde(default)]
    pub discount_percentage: u32,
    /// Bonus on earned points, percent on top of the base rate.
    #[serde(default)]
    pub points_boost: u32,
}

impl Promotions {
    pub const MAX_DISCOUNT: u32 = 100;
    pub const MAX_BOOST: u32 = 1000;

    /// Returns a copy with both percentages forced into their valid ranges.
    pub fn clamped(self) -> Self {
        Self {
            free_shipping: self.free_shipping,
            discount_percentage: self.discount_percentage.min(Self::MAX_DISCOUNT),
            points_boost: self.points_boost.min(Self::MAX_BOOST),
        }
    }
}
