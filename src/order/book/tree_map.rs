//! Order book implementation backed by BTreeMap price levels.
//!
//! This module provides a price-time priority limit order book using two
//! BTreeMaps (bids iterated descending, asks ascending). Each price level
//! maintains a FIFO queue of orders via indices into a Slab, avoiding frequent
//! allocations and allowing O(1) removal within a level. An incoming order is
//! matched on insertion by walking the opposite side from the best price while
//! its limit still crosses; whatever remains rests at its limit price.

use crate::fill::Fill;
use crate::order::book::{Book, Depth, DepthItem, Error};
use crate::order::{Order, OrderId, Price, Side};
use slab::Slab;
use std::cmp;
use std::collections::{BTreeMap, HashMap};

/// Aggregated state for a single price level.
///
/// Keeps the head/tail of a doubly-linked list of orders (by slab index), as
/// well as cumulative size and order count for quick depth queries. A level is
/// removed from its book the moment it becomes empty.
#[derive(Debug, Default)]
struct PriceLevel {
    head: Option<usize>,
    tail: Option<usize>,
    total_size: u64,
    total_orders: usize,
}

impl PriceLevel {
    /// Append an order node to the back of the level's FIFO queue and update
    /// aggregates. The `idx` must reference a valid entry in `orders`.
    fn push(&mut self, orders: &mut Slab<OrderNode>, idx: usize) {
        match self.tail {
            Some(tail) => {
                orders[tail].next = Some(idx);
                orders[idx].prev = Some(tail);
                self.tail = Some(idx);
            }
            None => {
                self.head = Some(idx);
                self.tail = Some(idx);
                orders[idx].prev = None;
            }
        }

        self.total_size += orders[idx].order.remaining();
        self.total_orders += 1;
    }

    /// Unlink a specific order node from the level's queue and update
    /// aggregates. The node must be currently linked in this level.
    fn remove(&mut self, orders: &mut Slab<OrderNode>, idx: usize) {
        let prev = orders[idx].prev;
        let next = orders[idx].next;

        if let Some(p) = prev {
            orders[p].next = next;
        } else {
            self.head = next;
        }
        if let Some(n) = next {
            orders[n].prev = prev;
        } else {
            self.tail = prev;
        }
        self.total_orders -= 1;
        self.total_size -= orders[idx].order.remaining();
        orders[idx].prev = None;
        orders[idx].next = None;
    }
}

/// Node representing an individual order stored in a slab and linked within a
/// price level's FIFO queue.
#[derive(Debug, Clone)]
struct OrderNode {
    order: Order,
    next: Option<usize>,
    prev: Option<usize>,
}

/// BTreeMap-backed order book implementing price-time priority.
///
/// The slab is the single owner of every resting order; levels hold queue
/// links and the id index holds slab keys, so an order can never be reachable
/// from the index without also being linked in exactly one level.
#[derive(Debug, Default)]
pub struct TreeMap {
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    orders: Slab<OrderNode>,
    order_index: HashMap<OrderId, usize>,
}

impl TreeMap {
    /// Create a new, empty TreeMap order book.
    pub fn new() -> Self {
        TreeMap::default()
    }

    fn side_book(&self, side: Side) -> &BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Best price on `side` that an incoming `taker` may still trade with,
    /// or None once the book no longer crosses its limit.
    fn best_crossing_price(&self, taker: &Order) -> Option<Price> {
        match taker.side {
            Side::Buy => self
                .asks
                .keys()
                .next()
                .copied()
                .filter(|price| *price <= taker.price),
            Side::Sell => self
                .bids
                .keys()
                .next_back()
                .copied()
                .filter(|price| *price >= taker.price),
        }
    }

    /// Match `taker` against resting liquidity, best price first, FIFO within
    /// each level. Fills are appended in the order they occur.
    fn execute(&mut self, taker: &mut Order) -> Vec<Fill> {
        let mut fills = Vec::new();
        while taker.remaining() > 0 {
            let Some(level_price) = self.best_crossing_price(taker) else {
                break;
            };
            self.drain_level(taker, level_price, &mut fills);
        }
        fills
    }

    /// Consume makers from the head of the level at `price` opposite the
    /// taker, until the taker is exhausted or the level empties (and is
    /// pruned).
    fn drain_level(&mut self, taker: &mut Order, price: Price, fills: &mut Vec<Fill>) {
        let maker_side = taker.side.opposite();
        while taker.remaining() > 0 {
            let Some(head) = self
                .side_book(maker_side)
                .get(&price)
                .and_then(|level| level.head)
            else {
                break;
            };

            let size = cmp::min(taker.remaining(), self.orders[head].order.remaining());
            fills.push(Fill {
                taker_order_id: taker.id.clone(),
                maker_order_id: self.orders[head].order.id.clone(),
                price,
                size,
                timestamp: taker.timestamp,
            });

            taker.executed += size;
            self.orders[head].order.executed += size;
            let level = match maker_side {
                Side::Buy => self.bids.get_mut(&price),
                Side::Sell => self.asks.get_mut(&price),
            };
            level.expect("crossing level exists while draining").total_size -= size;

            if self.orders[head].order.remaining() == 0 {
                self.remove_resting(head);
            }
        }
    }

    /// Rest an order with remaining size on its own side at its limit price,
    /// creating the level if absent, and register it in the id index.
    fn rest(&mut self, order: Order) {
        let side = order.side;
        let price = order.price;

        let idx = self.orders.insert(OrderNode {
            order,
            next: None,
            prev: None,
        });
        self.order_index.insert(self.orders[idx].order.id.clone(), idx);

        let level = match side {
            Side::Buy => self.bids.entry(price).or_default(),
            Side::Sell => self.asks.entry(price).or_default(),
        };
        level.push(&mut self.orders, idx);
    }

    /// Remove an order (by slab index) from its price level and delete it
    /// from the book, pruning the level if it became empty.
    fn remove_resting(&mut self, idx: usize) -> Order {
        let side = self.orders[idx].order.side;
        let price = self.orders[idx].order.price;

        let level = match side {
            Side::Buy => self.bids.get_mut(&price),
            Side::Sell => self.asks.get_mut(&price),
        };
        let level = level.expect("resting order has a level");
        level.remove(&mut self.orders, idx);
        if level.total_orders == 0 {
            match side {
                Side::Buy => self.bids.remove(&price),
                Side::Sell => self.asks.remove(&price),
            };
        }

        let node = self.orders.remove(idx);
        self.order_index.remove(&node.order.id);
        node.order
    }
}

impl Book for TreeMap {
    /// Match an incoming order and rest any remainder at its limit price.
    fn insert(&mut self, order: Order) -> Result<Vec<Fill>, Error> {
        // A resting duplicate would shadow the original in the index, so the
        // check must precede any matching.
        if self.order_index.contains_key(&order.id) {
            return Err(Error::OrderIdExists(order.id));
        }

        let mut taker = order;
        let fills = self.execute(&mut taker);
        if taker.remaining() > 0 {
            self.rest(taker);
        }
        Ok(fills)
    }

    /// Remove a resting order by id. Never touches the opposite book.
    fn cancel(&mut self, id: &str) -> Option<Order> {
        let idx = *self.order_index.get(id)?;
        Some(self.remove_resting(idx))
    }

    /// Return a snapshot of top-of-book depth up to `limit` levels per side.
    fn depth(&self, limit: usize) -> Depth {
        Depth {
            bids: self
                .bids
                .iter()
                .rev()
                .take(limit)
                .map(|(price, level)| DepthItem {
                    price: *price,
                    size: level.total_size,
                })
                .collect(),
            asks: self
                .asks
                .iter()
                .take(limit)
                .map(|(price, level)| DepthItem {
                    price: *price,
                    size: level.total_size,
                })
                .collect(),
        }
    }

    fn lookup(&self, id: &str) -> Option<&Order> {
        let idx = self.order_index.get(id)?;
        Some(&self.orders[*idx].order)
    }

    fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    fn order_count(&self) -> usize {
        self.orders.len()
    }
}
