//! Fill events produced by the matching engine.
//!
//! A Fill links the incoming (taker) order to one resting (maker) order it
//! executed against, along with the execution price and size. Fills are
//! emitted in the exact order matches occur and are never stored by the
//! engine.

use crate::order;
use serde::{Deserialize, Serialize};

/// A single execution between an incoming order and a resting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// The incoming order that triggered the match.
    pub taker_order_id: order::OrderId,
    /// The resting order that provided liquidity.
    pub maker_order_id: order::OrderId,
    /// Execution price. Always the maker's resting price, not the taker's
    /// limit.
    pub price: order::Price,
    /// Executed size for this fill. Always positive.
    pub size: order::Size,
    /// The taker's timestamp at insert time.
    pub timestamp: order::Timestamp,
}
