use std::collections::BTreeMap;

use crate::domain::Product;
use crate::error::CartError;

/// One cart line. Prices and stock are snapshots from when the line was
/// added; checkout re-reads both from the store before committing.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub name: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub quantity: u32,
    pub stock: u32,
}

/// Client-held cart, keyed by product id. Quantity edits are capped at the
/// stock known when the product was added.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: BTreeMap<String, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        if product.stock == 0 {
            return Err(CartError::StockExceeded {
                name: product.name.clone(),
                available: 0,
            });
        }
        let current = self
            .lines
            .get(&product.id)
            .map(|line| line.quantity)
            .unwrap_or(0);
        let wanted = current + quantity;
        if wanted > product.stock {
            return Err(CartError::StockExceeded {
                name: product.name.clone(),
                available: product.stock,
            });
        }
        self.lines.insert(
            product.id.clone(),
            CartLine {
                name: product.name.clone(),
                price: product.price,
                discount_price: product.discount_price,
                quantity: wanted,
                stock: product.stock,
            },
        );
        Ok(())
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        let Some(line) = self.lines.get_mut(product_id) else {
            return Err(CartError::UnknownLine(product_id.to_string()));
        };
        if quantity == 0 {
            self.lines.remove(product_id);
            return Ok(());
        }
        if quantity > line.stock {
            return Err(CartError::StockExceeded {
                name: line.name.clone(),
                available: line.stock,
            });
        }
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) {
        self.lines.remove(product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_items(&self) -> u32 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    pub fn lines(&self) -> impl Iterator<Item = (&str, &CartLine)> {
        self.lines.iter().map(|(id, line)| (id.as_str(), line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coal(stock: u32) -> Product {
        Product {
            id: "Coal".into(),
            name: "Coal".into(),
            category: "ore".into(),
            description: String::new(),
            img: String::new(),
            price: 1.0,
            discount_price: None,
            stock,
            kit: None,
        }
    }

    #[test]
    fn adding_accumulates_until_stock_is_hit() {
        let mut cart = Cart::new();
        let product = coal(5);
        cart.add(&product, 3).unwrap();
        cart.add(&product, 2).unwrap();
        assert_eq!(cart.total_items(), 5);

        let err = cart.add(&product, 1).unwrap_err();
        assert_eq!(
            err,
            CartError::StockExceeded {
                name: "Coal".into(),
                available: 5
            }
        );
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn out_of_stock_product_cannot_be_added() {
        let mut cart = Cart::new();
        assert!(cart.add(&coal(0), 1).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn zero_quantity_removes_the_line() {
        let mut cart = Cart::new();
        cart.add(&coal(5), 2).unwrap();
        cart.set_quantity("Coal", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn quantity_edits_are_stock_capped() {
        let mut cart = Cart::new();
        cart.add(&coal(5), 2).unwrap();
        assert!(cart.set_quantity("Coal", 6).is_err());
        cart.set_quantity("Coal", 5).unwrap();
        assert_eq!(cart.total_items(), 5);
    }
}
