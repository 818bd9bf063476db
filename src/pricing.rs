//! Checkout arithmetic. Deterministic and store-free: callers feed it
//! line amounts, the promotion settings, and the buyer's live point
//! balance; every business number comes from [`PricingRules`].

use crate::domain::{DeliveryMethod, Promotions};

/// The hard-coded shop economics, surfaced as configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRules {
    /// Fraction of the subtotal earned back as points (before boost).
    pub base_earn_rate: f64,
    pub normal_fee: f64,
    pub normal_free_threshold: f64,
    pub express_fee: f64,
    pub express_free_threshold: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            base_earn_rate: 0.01,
            normal_fee: 0.5,
            normal_free_threshold: 10.0,
            express_fee: 1.0,
            express_free_threshold: 15.0,
        }
    }
}

/// How much of the point balance to spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsChoice {
    None,
    /// User-chosen amount, capped at the spendable bound.
    Partial(u32),
    All,
}

/// One priced line: the effective unit price times a quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine {
    pub unit_price: f64,
    pub quantity: u32,
}

/// A fully computed checkout quote. `total` is ceiled to a whole coal and
/// may be negative, in which case the order must not be placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub subtotal: f64,
    pub discount: f64,
    pub shipping_fee: f64,
    pub points_used: u32,
    pub points_earned: u32,
    pub total: f64,
}

pub fn quote(
    lines: &[PricedLine],
    promotions: Promotions,
    delivery: DeliveryMethod,
    points: PointsChoice,
    balance: u32,
    rules: &PricingRules,
) -> Quote {
    let subtotal: f64 = lines
        .iter()
        .map(|line| line.unit_price * f64::from(line.quantity))
        .sum();

    let discount = subtotal * f64::from(promotions.discount_percentage) / 100.0;

    let shipping_fee = if promotions.free_shipping {
        0.0
    } else {
        match delivery {
            DeliveryMethod::Express if subtotal >= rules.express_free_threshold => 0.0,
            DeliveryMethod::Express => rules.express_fee,
            DeliveryMethod::Normal if subtotal >= rules.normal_free_threshold => 0.0,
            DeliveryMethod::Normal => rules.normal_fee,
        }
    };

    let boost = 1.0 + f64::from(promotions.points_boost) / 100.0;
    let points_earned = (subtotal * rules.base_earn_rate * boost).floor() as u32;

    // Points are only spendable up to the whole-coal part of the subtotal.
    let bound = (subtotal.floor().max(0.0) as u32).min(balance);
    let points_used = match points {
        PointsChoice::None => 0,
        PointsChoice::Partial(n) => n.min(bound),
        PointsChoice::All => bound,
    };

    let total = (subtotal - discount + shipping_fee - f64::from(points_used)).ceil();

    Quote {
        subtotal,
        discount,
        shipping_fee,
        points_used,
        points_earned,
        total,
    }
}
