//! Order book trait and shared types.
//!
//! This module defines the minimal interface expected from an order book
//! implementation, the common types used to represent market depth, and the
//! validation errors surfaced to callers.

pub mod tree_map;

use crate::fill::Fill;
use crate::order::{Order, OrderId, Price, Size, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aggregated depth at a single price level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthItem {
    /// Price level.
    pub price: Price,
    /// Total remaining size at this price level.
    pub size: Size,
}

/// A snapshot of the best price levels on both sides of the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Depth {
    /// Best bids in descending price order.
    pub bids: Vec<DepthItem>,
    /// Best asks in ascending price order.
    pub asks: Vec<DepthItem>,
}

/// Validation errors. Every variant leaves the engine state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("order id cannot be empty")]
    /// Insert or cancel called with an empty order id.
    EmptyOrderId,
    #[error("order price must be a positive number of ticks")]
    /// Insert called with a zero price.
    InvalidPrice,
    #[error("order size must be a positive number of lots")]
    /// Insert called with a zero size.
    InvalidSize,
    #[error("order timestamp cannot be negative, got {0}")]
    /// Insert called with a negative timestamp.
    InvalidTimestamp(Timestamp),
    #[error("another order with id {0:?} is already resting")]
    /// Insert called with an id that is currently resting in the book.
    OrderIdExists(OrderId),
}

/// The core order book interface. Implementors must provide insertion with
/// immediate matching, cancellation, depth, and lookup of resting orders.
pub trait Book {
    /// Insert a new order. The order is matched against the opposite side
    /// first; any remainder rests at its limit price. Returns the fills in
    /// the order they occurred, or an error if the id is already resting
    /// (in which case the book is unchanged).
    fn insert(&mut self, order: Order) -> Result<Vec<Fill>, Error>;
    /// Remove a resting order by id, returning it. `None` if no order with
    /// that id is resting.
    fn cancel(&mut self, id: &str) -> Option<Order>;
    /// Returns a depth snapshot for the requested number of price levels per
    /// side.
    fn depth(&self, limit: usize) -> Depth;
    /// Gets a resting order by its id.
    fn lookup(&self, id: &str) -> Option<&Order>;
    /// Highest resting bid price, if any.
    fn best_bid(&self) -> Option<Price>;
    /// Lowest resting ask price, if any.
    fn best_ask(&self) -> Option<Price>;
    /// Number of resting orders across both sides.
    fn order_count(&self) -> usize;

    /// Distance between the best ask and the best bid. `None` while either
    /// side is empty.
    fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.checked_sub(bid),
            _ => None,
        }
    }
}
