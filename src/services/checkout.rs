use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::domain::{
    Cart, DeliveryMethod, Order, OrderItem, OrderStatus, PaymentMethod, Product, Promotions, User,
};
use crate::error::CheckoutError;
use crate::pricing::{self, PointsChoice, PricedLine, PricingRules, Quote};
use crate::session::Session;
use crate::store::{paths, Guard, Path, StoreClient, StoreError, Transaction};

#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    pub delivery: DeliveryMethod,
    pub payment: PaymentMethod,
    pub branch: String,
    pub points: PointsChoice,
}

/// How many times a commit is retried when a price moved between the product
/// read and the commit. Stock shortfalls are never retried.
const MAX_ATTEMPTS: u32 = 3;

/// Turns a cart into a committed order.
///
/// Everything that matters is re-read from the store and the commit itself
/// is conditional: per-product stock and price guards plus a points guard,
/// the order create, and the stock/points adjustments all apply together or
/// not at all. Two buyers racing for the last items cannot both win.
#[derive(Clone)]
pub struct CheckoutService {
    store: StoreClient,
    rules: PricingRules,
}

impl CheckoutService {
    pub fn new(store: StoreClient, rules: PricingRules) -> Self {
        Self { store, rules }
    }

    /// Price preview against live products and promotions. No writes.
    #[instrument(fields(items = cart.total_items()), skip_all)]
    pub async fn quote(
        &self,
        cart: &Cart,
        options: &CheckoutOptions,
        balance: u32,
    ) -> Result<Quote, CheckoutError> {
        let (joined, promotions) = self.live_lines(cart).await?;
        let priced: Vec<PricedLine> = joined
            .iter()
            .map(|(_, product, quantity)| PricedLine {
                unit_price: product.effective_price(),
                quantity: *quantity,
            })
            .collect();
        Ok(pricing::quote(
            &priced,
            promotions,
            options.delivery,
            options.points,
            balance,
            &self.rules,
        ))
    }

    #[instrument(fields(user_id = %session.user_id, items = cart.total_items()), skip_all)]
    pub async fn place_order(
        &self,
        session: &Session,
        cart: &mut Cart,
        options: &CheckoutOptions,
    ) -> Result<(String, Order), CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if options.branch.trim().is_empty() {
            return Err(CheckoutError::MissingBranch);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut user: User = self
                .store
                .get_as(paths::user(&session.user_id))
                .await?
                .ok_or_else(|| CheckoutError::UserNotFound(session.user_id.clone()))?;
            user.id = session.user_id.clone();
            if !user.approved {
                return Err(CheckoutError::NotApproved);
            }

            let branches: Vec<String> = self
                .store
                .get_as(paths::branches())
                .await?
                .unwrap_or_default();
            if !branches.contains(&options.branch) {
                return Err(CheckoutError::UnknownBranch(options.branch.clone()));
            }

            let (joined, promotions) = self.live_lines(cart).await?;

            let mut priced = Vec::with_capacity(joined.len());
            let mut items = BTreeMap::new();
            let mut guards = Vec::new();
            let mut stock_adjusts = Vec::new();
            for (id, product, quantity) in &joined {
                if product.stock < *quantity {
                    error!(product = %product.name, available = product.stock, "Insufficient stock");
                    return Err(CheckoutError::InsufficientStock {
                        name: product.name.clone(),
                        requested: *quantity,
                        available: product.stock,
                    });
                }

                let unit_price = product.effective_price();
                priced.push(PricedLine {
                    unit_price,
                    quantity: *quantity,
                });
                items.insert(
                    id.clone(),
                    OrderItem {
                        name: product.name.clone(),
                        price: unit_price,
                        quantity: *quantity,
                        total: unit_price * f64::from(*quantity),
                    },
                );

                guards.push(Guard::at_least(
                    paths::product_stock(id),
                    f64::from(*quantity),
                ));
                let price_path = if product.priced_by_discount() {
                    paths::product_discount_price(id)
                } else {
                    paths::product_price(id)
                };
                guards.push(Guard::equals(price_path, unit_price));
                stock_adjusts.push((paths::product_stock(id), -f64::from(*quantity)));
            }

            let quote = pricing::quote(
                &priced,
                promotions,
                options.delivery,
                options.points,
                user.points,
                &self.rules,
            );
            if quote.total < 0.0 {
                return Err(CheckoutError::NegativeTotal(quote.total));
            }

            let mut order = Order {
                id: String::new(),
                user_uid: user.id.clone(),
                user_email: user.email.clone(),
                items,
                subtotal: quote.subtotal,
                discount: quote.discount,
                shipping_fee: quote.shipping_fee,
                points_used: quote.points_used,
                points_earned: quote.points_earned,
                total: quote.total,
                delivery_method: options.delivery,
                payment_method: options.payment,
                branch: options.branch.clone(),
                status: OrderStatus::Pending,
                timestamp: Utc::now(),
                shipping_branch: None,
                shipped_at: None,
                rejection_reason: None,
            };
            let order_node =
                serde_json::to_value(&order).map_err(|e| StoreError::Malformed {
                    path: paths::orders(),
                    reason: e.to_string(),
                })?;

            let mut tx = Transaction::new(paths::orders(), order_node);
            tx.guards = guards;
            if quote.points_used > 0 {
                tx = tx.guard(Guard::at_least(
                    paths::user_points(&user.id),
                    f64::from(quote.points_used),
                ));
            }
            for (path, delta) in stock_adjusts {
                tx = tx.adjust(path, delta);
            }
            let points_delta =
                f64::from(quote.points_earned) - f64::from(quote.points_used);
            if points_delta != 0.0 {
                tx = tx.adjust(paths::user_points(&user.id), points_delta);
            }

            match self.store.commit(tx).await {
                Ok(id) => {
                    cart.clear();
                    order.id = id.clone();
                    info!(order_id = %id, total = order.total, "Order placed");
                    return Ok((id, order));
                }
                Err(StoreError::GuardFailed { path, observed }) => {
                    match self.classify_guard_failure(&path, observed, cart, quote.points_used) {
                        GuardFailure::Stock(err) | GuardFailure::Points(err) => return Err(err),
                        GuardFailure::Price(name) => {
                            if attempt >= MAX_ATTEMPTS {
                                return Err(CheckoutError::PriceChanged(name));
                            }
                            warn!(product = %name, attempt, "Price moved during checkout, re-quoting");
                            continue;
                        }
                        GuardFailure::Other(err) => return Err(err),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn live_lines(
        &self,
        cart: &Cart,
    ) -> Result<(Vec<(String, Product, u32)>, Promotions), CheckoutError> {
        let promotions: Promotions = self
            .store
            .get_as(paths::promotions())
            .await?
            .unwrap_or_default();

        let mut joined = Vec::new();
        for (id, line) in cart.lines() {
            let mut product: Product = self
                .store
                .get_as(paths::product(id))
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(id.to_string()))?;
            product.id = id.to_string();
            joined.push((id.to_string(), product, line.quantity));
        }
        Ok((joined, promotions))
    }

    fn classify_guard_failure(
        &self,
        path: &Path,
        observed: f64,
        cart: &Cart,
        points_requested: u32,
    ) -> GuardFailure {
        match path.segments() {
            [collection, id, field]
                if collection.as_str() == "products" && field.as_str() == "stock" =>
            {
                let (name, requested) = cart
                    .lines()
                    .find(|(line_id, _)| *line_id == id.as_str())
                    .map(|(_, line)| (line.name.clone(), line.quantity))
                    .unwrap_or_else(|| (id.clone(), 0));
                GuardFailure::Stock(CheckoutError::InsufficientStock {
                    name,
                    requested,
                    available: observed.max(0.0) as u32,
                })
            }
            [collection, id, _] if collection.as_str() == "products" => {
                let name = cart
                    .lines()
                    .find(|(line_id, _)| *line_id == id.as_str())
                    .map(|(_, line)| line.name.clone())
                    .unwrap_or_else(|| id.clone());
                GuardFailure::Price(name)
            }
            [collection, _, field]
                if collection.as_str() == "users" && field.as_str() == "points" =>
            {
                GuardFailure::Points(CheckoutError::InsufficientPoints {
                    requested: points_requested,
                    available: observed.max(0.0) as u32,
                })
            }
            _ => GuardFailure::Other(CheckoutError::Store(StoreError::GuardFailed {
                path: path.clone(),
                observed,
            })),
        }
    }
}

enum GuardFailure {
    Stock(CheckoutError),
    Price(String),
    Points(CheckoutError),
    Other(CheckoutError),
}
