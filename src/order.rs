use serde::{Deserialize, Serialize};

/// Side of the book an order belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order of this side matches against.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Caller-assigned order identifier. Must be non-empty and unique among
/// resting orders.
pub type OrderId = String;
pub type Price = u64; // ticks
pub type Size = u64; // lots
/// Caller-supplied event time. Signed so that negative inputs can be rejected
/// at the boundary instead of wrapping.
pub type Timestamp = i64;

/// A limit order. Identity, side, price, and timestamp never change after
/// creation; only the executed amount grows as the order fills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    /// Original size at insertion.
    pub size: Size,
    /// Amount filled so far. Never exceeds `size`.
    pub executed: Size,
    pub timestamp: Timestamp,
}

impl Order {
    pub fn new(id: OrderId, side: Side, price: Price, size: Size, timestamp: Timestamp) -> Self {
        Order {
            id,
            side,
            price,
            size,
            executed: 0,
            timestamp,
        }
    }

    pub fn remaining(&self) -> Size {
        self.size - self.executed
    }
}

pub mod book;
