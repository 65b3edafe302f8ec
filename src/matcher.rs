use crate::fill::Fill;
use crate::order::book::{Book, Depth, Error};
use crate::order::{Order, OrderId, Price, Side, Size, Timestamp};
use tracing::{debug, trace};

/// A thin orchestrator over an order book that:
/// - validates incoming parameters before any book mutation,
/// - forwards accepted operations to the underlying book,
/// - and emits structured log events for accepted operations.
///
/// All matching happens synchronously inside the call; the matcher holds no
/// state of its own beyond the book.
pub struct Matcher<T: Book> {
    book: T,
}

impl<T: Book + Default> Default for Matcher<T> {
    fn default() -> Self {
        Matcher::new(T::default())
    }
}

impl<T: Book> Matcher<T> {
    /// Create a new matcher around the given book.
    pub fn new(book: T) -> Self {
        Self { book }
    }

    /// Insert a new limit order and return the fills it produced, in the
    /// order they occurred.
    ///
    /// The order matches against the opposite side at the maker's resting
    /// prices while its limit crosses; any remainder rests at the limit
    /// price. An empty fill list means the order rested untouched.
    ///
    /// Fails fast without touching the book on an empty id, a zero price or
    /// size, a negative timestamp, or an id that is already resting.
    pub fn insert(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        size: Size,
        timestamp: Timestamp,
    ) -> Result<Vec<Fill>, Error> {
        if id.is_empty() {
            return Err(Error::EmptyOrderId);
        }
        if price == 0 {
            return Err(Error::InvalidPrice);
        }
        if size == 0 {
            return Err(Error::InvalidSize);
        }
        if timestamp < 0 {
            return Err(Error::InvalidTimestamp(timestamp));
        }

        debug!(order_id = %id, side = ?side, price, size, "inserting order");
        let order = Order::new(id, side, price, size, timestamp);
        let fills = self.book.insert(order)?;

        for fill in &fills {
            trace!(
                taker = %fill.taker_order_id,
                maker = %fill.maker_order_id,
                price = fill.price,
                size = fill.size,
                "fill"
            );
        }

        Ok(fills)
    }

    /// Cancel a resting order by id.
    ///
    /// Returns `Ok(true)` if the order was resting and has been removed, and
    /// `Ok(false)` for an id that is not currently resting (never inserted,
    /// fully filled, or already cancelled). Only an empty id is an error.
    pub fn cancel(&mut self, id: &str) -> Result<bool, Error> {
        if id.is_empty() {
            return Err(Error::EmptyOrderId);
        }

        let cancelled = self.book.cancel(id);
        debug!(order_id = id, cancelled = cancelled.is_some(), "cancel");
        Ok(cancelled.is_some())
    }

    /// Get aggregated depth up to `limit` levels per side.
    pub fn depth(&self, limit: usize) -> Depth {
        self.book.depth(limit)
    }

    /// Lookup a resting order by id.
    pub fn lookup(&self, id: &str) -> Option<&Order> {
        self.book.lookup(id)
    }

    /// Highest resting bid price, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid()
    }

    /// Lowest resting ask price, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask()
    }

    /// Distance between the best ask and the best bid. `None` while either
    /// side is empty.
    pub fn spread(&self) -> Option<u64> {
        self.book.spread()
    }

    /// Number of resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.book.order_count()
    }

    /// True when no orders rest on either side.
    pub fn is_empty(&self) -> bool {
        self.book.order_count() == 0
    }
}
