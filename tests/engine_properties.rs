//! Property tests driving the engine through random operation sequences and
//! auditing the public surface after every step: the book stays uncrossed, no
//! empty level is ever surfaced, sizes are conserved between fills and
//! resting remainders, fills respect price then time priority, and cancels
//! are idempotent.

use matchbook::{Depth, Fill, Matcher, Side, TreeMap};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Insert { buy: bool, price: u64, size: u64 },
    Cancel { target: usize },
}

/// Narrow price band and small sizes so sequences cross, sweep, and partially
/// fill often instead of only resting.
fn arb_ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => (any::<bool>(), 1u64..=12, 1u64..=6)
                .prop_map(|(buy, price, size)| Op::Insert { buy, price, size }),
            1 => (0usize..64).prop_map(|target| Op::Cancel { target }),
        ],
        1..max_len,
    )
}

fn run(ops: &[Op]) -> (Vec<Fill>, Depth) {
    let mut m = Matcher::new(TreeMap::new());
    let mut ids: Vec<String> = Vec::new();
    let mut all_fills = Vec::new();
    for (i, op) in ops.iter().enumerate() {
        match op {
            Op::Insert { buy, price, size } => {
                let id = format!("o{i}");
                let side = if *buy { Side::Buy } else { Side::Sell };
                let fills = m.insert(id.clone(), side, *price, *size, i as i64).unwrap();
                ids.push(id);
                all_fills.extend(fills);
            }
            Op::Cancel { target } => {
                if ids.is_empty() {
                    let _ = m.cancel("never-inserted").unwrap();
                } else {
                    let _ = m.cancel(&ids[target % ids.len()]).unwrap();
                }
            }
        }
    }
    (all_fills, m.depth(usize::MAX))
}

/// Audit the visible book state against an externally maintained ledger of
/// expected remainders.
fn check_book_against_ledger(
    m: &Matcher<TreeMap>,
    remaining: &HashMap<String, u64>,
) -> Result<(), TestCaseError> {
    if let (Some(bid), Some(ask)) = (m.best_bid(), m.best_ask()) {
        prop_assert!(bid < ask, "book crossed: bid {} >= ask {}", bid, ask);
    }

    let depth = m.depth(usize::MAX);
    for w in depth.bids.windows(2) {
        prop_assert!(w[0].price > w[1].price, "bids not strictly descending");
    }
    for w in depth.asks.windows(2) {
        prop_assert!(w[0].price < w[1].price, "asks not strictly ascending");
    }
    for item in depth.bids.iter().chain(depth.asks.iter()) {
        prop_assert!(item.size > 0, "empty level surfaced at price {}", item.price);
    }

    let bid_sum: u64 = depth.bids.iter().map(|i| i.size).sum();
    let ask_sum: u64 = depth.asks.iter().map(|i| i.size).sum();

    let mut ledger_bid_sum = 0u64;
    let mut ledger_ask_sum = 0u64;
    for (id, expected) in remaining {
        let order = m.lookup(id);
        prop_assert!(order.is_some(), "live order {} missing from book", id);
        let order = order.unwrap();
        prop_assert_eq!(
            order.remaining(),
            *expected,
            "remaining mismatch for {}",
            id
        );
        match order.side {
            Side::Buy => ledger_bid_sum += *expected,
            Side::Sell => ledger_ask_sum += *expected,
        }
    }
    prop_assert_eq!(m.order_count(), remaining.len());
    prop_assert_eq!(bid_sum, ledger_bid_sum, "bid size conservation violated");
    prop_assert_eq!(ask_sum, ledger_ask_sum, "ask size conservation violated");

    Ok(())
}

proptest! {
    #[test]
    fn op_sequences_preserve_book_invariants(ops in arb_ops(48)) {
        let mut m = Matcher::new(TreeMap::new());
        let mut ids: Vec<String> = Vec::new();
        // Expected remaining size per live (resting) order.
        let mut remaining: HashMap<String, u64> = HashMap::new();
        // Operation index at which each resting order arrived, for FIFO checks.
        let mut rest_seq: HashMap<String, usize> = HashMap::new();

        for (i, op) in ops.iter().enumerate() {
            match op {
                Op::Insert { buy, price, size } => {
                    let id = format!("o{i}");
                    let side = if *buy { Side::Buy } else { Side::Sell };
                    let fills = m.insert(id.clone(), side, *price, *size, i as i64).unwrap();

                    let mut taker_total = 0u64;
                    let mut last_price: Option<u64> = None;
                    let mut last_seq_at_price: Option<usize> = None;
                    for f in &fills {
                        prop_assert!(f.size > 0, "zero-size fill emitted");
                        prop_assert_eq!(&f.taker_order_id, &id);
                        prop_assert_ne!(&f.maker_order_id, &id);
                        prop_assert_eq!(f.timestamp, i as i64);
                        if *buy {
                            prop_assert!(f.price <= *price, "fill above buy limit");
                        } else {
                            prop_assert!(f.price >= *price, "fill below sell limit");
                        }

                        // Price priority: fill prices are monotone in
                        // emission order, best price first.
                        if let Some(lp) = last_price {
                            if *buy {
                                prop_assert!(f.price >= lp, "buy fills must not improve");
                            } else {
                                prop_assert!(f.price <= lp, "sell fills must not improve");
                            }
                            if f.price != lp {
                                last_seq_at_price = None;
                            }
                        }
                        // Time priority: within one price, makers appear in
                        // arrival order.
                        let seq = rest_seq[&f.maker_order_id];
                        if let Some(ls) = last_seq_at_price {
                            prop_assert!(seq > ls, "level FIFO violated");
                        }
                        last_seq_at_price = Some(seq);
                        last_price = Some(f.price);

                        taker_total += f.size;
                        let r = remaining
                            .get_mut(&f.maker_order_id)
                            .expect("maker must be a live resting order");
                        prop_assert!(*r >= f.size, "maker overfilled");
                        *r -= f.size;
                        if *r == 0 {
                            remaining.remove(&f.maker_order_id);
                        }
                    }

                    prop_assert!(taker_total <= *size, "taker overfilled");
                    if taker_total < *size {
                        remaining.insert(id.clone(), *size - taker_total);
                        rest_seq.insert(id.clone(), i);
                    }
                    ids.push(id);
                }
                Op::Cancel { target } => {
                    if ids.is_empty() {
                        prop_assert!(!m.cancel("never-inserted").unwrap());
                    } else {
                        let id = ids[target % ids.len()].clone();
                        let was_live = remaining.remove(&id).is_some();
                        prop_assert_eq!(m.cancel(&id).unwrap(), was_live);
                        prop_assert!(!m.cancel(&id).unwrap(), "cancel must not revive");
                    }
                }
            }

            check_book_against_ledger(&m, &remaining)?;
        }
    }

    #[test]
    fn identical_op_sequences_are_deterministic(ops in arb_ops(32)) {
        let (fills_a, depth_a) = run(&ops);
        let (fills_b, depth_b) = run(&ops);
        prop_assert_eq!(fills_a, fills_b);
        prop_assert_eq!(depth_a.bids, depth_b.bids);
        prop_assert_eq!(depth_a.asks, depth_b.asks);
    }

    #[test]
    fn non_crossing_insert_then_cancel_is_a_noop(ops in arb_ops(24), buy in any::<bool>()) {
        let mut m = Matcher::new(TreeMap::new());
        let mut ids: Vec<String> = Vec::new();
        for (i, op) in ops.iter().enumerate() {
            match op {
                Op::Insert { buy, price, size } => {
                    let id = format!("o{i}");
                    let side = if *buy { Side::Buy } else { Side::Sell };
                    m.insert(id.clone(), side, *price, *size, i as i64).unwrap();
                    ids.push(id);
                }
                Op::Cancel { target } => {
                    if !ids.is_empty() {
                        let _ = m.cancel(&ids[target % ids.len()]).unwrap();
                    }
                }
            }
        }

        let side = if buy { Side::Buy } else { Side::Sell };
        // Probe one tick away from the far side so the order cannot cross.
        let price = match side {
            Side::Buy => m.best_ask().map_or(5, |a| a.saturating_sub(1).max(1)),
            Side::Sell => m.best_bid().map_or(500, |b| b + 1),
        };
        let crosses = match side {
            Side::Buy => m.best_ask().is_some_and(|a| price >= a),
            Side::Sell => m.best_bid().is_some_and(|b| price <= b),
        };
        prop_assume!(!crosses);

        let before = m.depth(usize::MAX);
        let count_before = m.order_count();

        let fills = m.insert("probe".to_string(), side, price, 3, 9_999).unwrap();
        prop_assert!(fills.is_empty(), "non-crossing probe filled: {:?}", fills);
        prop_assert!(m.cancel("probe").unwrap());

        let after = m.depth(usize::MAX);
        prop_assert_eq!(before.bids, after.bids);
        prop_assert_eq!(before.asks, after.asks);
        prop_assert_eq!(m.order_count(), count_before);
        prop_assert!(!m.cancel("probe").unwrap());
    }
}
