use thiserror::Error;

use crate::store::StoreError;

/// Cart edits are validated locally, before any store traffic.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("only {available} of {name} in stock")]
    StockExceeded { name: String, available: u32 },
    #[error("no such item in cart: {0}")]
    UnknownLine(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("invalid registration: {0}")]
    Validation(String),
    #[error("username already taken: {0}")]
    UserExists(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("wrong password")]
    WrongPassword,
    #[error("account awaiting admin approval")]
    NotApproved,
    #[error("session persistence failed: {0}")]
    Session(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("no shipping branch selected")]
    MissingBranch,
    #[error("unknown shipping branch: {0}")]
    UnknownBranch(String),
    #[error("account awaiting admin approval")]
    NotApproved,
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },
    #[error("insufficient points: requested {requested}, available {available}")]
    InsufficientPoints { requested: u32, available: u32 },
    #[error("price of {0} changed during checkout")]
    PriceChanged(String),
    #[error("order total is negative: {0}")]
    NegativeTotal(f64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Tracking lookups and bulk-order submission.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("order not found: {0}")]
    NotFound(String),
    #[error("order {0} does not belong to you")]
    AccessDenied(String),
    #[error("invalid submission: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdminError {
    #[error("admin rank required ({0})")]
    Forbidden(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("order not found: {0}")]
    OrderNotFound(String),
    #[error("no transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("a rejection reason is required")]
    MissingReason,
    #[error("invalid branch name: {0:?}")]
    InvalidBranch(String),
    #[error("final price must be positive, got {0}")]
    InvalidPrice(f64),
    #[error(transparent)]
    Store(#[from] StoreError),
}
