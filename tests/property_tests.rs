//! Property-based invariants over random operation sequences.
//!
//! A side model tracks each live order's remaining quantity from the
//! observable events (admissions, trade emissions, cancel returns), then
//! the book is checked against it: uncrossed top of book, exact order
//! index, aggregate-quantity conservation, and a clean slate after
//! cancelling everything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use matchbook_rs::prelude::*;

const SYMBOL: &str = "BTCUSD";
const BASE_PRICE: i64 = 10_000;

#[derive(Debug, Clone, Copy)]
enum Op {
    Add { side: Side, price_offset: i64, quantity: u32 },
    Cancel { pick: usize },
    Modify { pick: usize, price_offset: i64, quantity: u32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<bool>(), -5i64..=5, 1u32..=20).prop_map(|(buy, price_offset, quantity)| {
            Op::Add {
                side: if buy { Side::Buy } else { Side::Sell },
                price_offset,
                quantity,
            }
        }),
        1 => (0usize..64).prop_map(|pick| Op::Cancel { pick }),
        1 => ((0usize..64), -5i64..=5, 1u32..=20).prop_map(|(pick, price_offset, quantity)| {
            Op::Modify { pick, price_offset, quantity }
        }),
    ]
}

/// Remaining-quantity model: mirrors the order index from observable
/// events only.
struct Model {
    remaining: HashMap<u64, u32>,
    submitted: HashMap<u64, u32>,
    filled: HashMap<u64, u64>,
}

impl Model {
    fn new() -> Self {
        Self {
            remaining: HashMap::new(),
            submitted: HashMap::new(),
            filled: HashMap::new(),
        }
    }

    fn apply_trades(&mut self, trades: &[Trade]) {
        for trade in trades {
            assert!(trade.quantity > 0, "zero-quantity trade emitted");
            for id in [trade.buy_order_id, trade.sell_order_id] {
                let remaining = self
                    .remaining
                    .get_mut(&id)
                    .unwrap_or_else(|| panic!("trade references unknown order {id}"));
                assert!(
                    *remaining >= trade.quantity,
                    "order {id} overfilled: {} remaining, {} traded",
                    remaining,
                    trade.quantity
                );
                *remaining -= trade.quantity;
                if *remaining == 0 {
                    self.remaining.remove(&id);
                }
                *self.filled.entry(id).or_insert(0) += trade.quantity as u64;
            }
        }
    }

    fn total_remaining(&self) -> u64 {
        self.remaining.values().map(|&q| q as u64).sum()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_operations_preserve_book_invariants(
        ops in proptest::collection::vec(op_strategy(), 1..60)
    ) {
        let log = Arc::new(Mutex::new(Vec::<Trade>::new()));
        let sink = Arc::clone(&log);
        let book = OrderBook::with_trade_listener(
            SYMBOL,
            Arc::new(move |trade: &Trade| sink.lock().unwrap().push(*trade)),
        );

        let mut model = Model::new();
        let mut ids: Vec<u64> = Vec::new();
        let mut next_id = 1u64;
        let mut seen = 0usize;

        for op in &ops {
            match *op {
                Op::Add { side, price_offset, quantity } => {
                    let id = next_id;
                    next_id += 1;
                    let order = Order {
                        id,
                        side,
                        kind: OrderKind::Limit,
                        price: BASE_PRICE + price_offset,
                        quantity,
                        timestamp: id,
                        symbol: Symbol::new(SYMBOL),
                    };
                    model.remaining.insert(id, quantity);
                    model.submitted.insert(id, quantity);
                    ids.push(id);
                    book.add_order(order).unwrap();
                }
                Op::Cancel { pick } => {
                    if ids.is_empty() {
                        continue;
                    }
                    let id = ids[pick % ids.len()];
                    if let Some(order) = book.cancel_order(id) {
                        let tracked = model.remaining.remove(&id);
                        prop_assert_eq!(tracked, Some(order.quantity));
                    } else {
                        prop_assert!(!model.remaining.contains_key(&id));
                    }
                }
                Op::Modify { pick, price_offset, quantity } => {
                    if ids.is_empty() {
                        continue;
                    }
                    let id = ids[pick % ids.len()];
                    let was_live = model.remaining.contains_key(&id);
                    let changed = book.modify_order(id, BASE_PRICE + price_offset, quantity)
                        .unwrap();
                    prop_assert_eq!(changed, was_live);
                    if changed {
                        model.remaining.insert(id, quantity);
                    }
                }
            }

            // Fold the trades this operation emitted into the model.
            let trades = log.lock().unwrap();
            model.apply_trades(&trades[seen..]);
            seen = trades.len();
        }

        // Quiescent book is never crossed.
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            prop_assert!(bid < ask, "crossed book: bid {} >= ask {}", bid, ask);
        }

        // The order index contains exactly the model's live set.
        for id in &ids {
            prop_assert_eq!(
                book.contains_order(*id),
                model.remaining.contains_key(id),
                "index disagrees on order {}", id
            );
        }

        // Aggregate quantities conserve: book totals equal the sum of live
        // remaining quantities, and the snapshot agrees per side. The price
        // range keeps each side within the snapshot's 20-level window.
        let book_total = book.total_quantity_on(Side::Buy) + book.total_quantity_on(Side::Sell);
        prop_assert_eq!(book_total, model.total_remaining());

        let snapshot = book.get_snapshot();
        prop_assert_eq!(snapshot.total_bid_volume(), book.total_quantity_on(Side::Buy));
        prop_assert_eq!(snapshot.total_ask_volume(), book.total_quantity_on(Side::Sell));

        // Snapshot levels are strictly ordered: bids descending, asks
        // ascending.
        let bids = &snapshot.bids[..snapshot.bid_count as usize];
        prop_assert!(bids.windows(2).all(|w| w[0].price > w[1].price));
        let asks = &snapshot.asks[..snapshot.ask_count as usize];
        prop_assert!(asks.windows(2).all(|w| w[0].price < w[1].price));

        // Fills never exceed the originally submitted quantity.
        for (id, filled) in &model.filled {
            let submitted = model.submitted[id] as u64;
            prop_assert!(
                *filled <= submitted,
                "order {} filled {} of {} submitted", id, filled, submitted
            );
        }

        // Cancelling everything empties the book.
        book.cancel_all_orders();
        prop_assert!(book.is_empty());
        prop_assert_eq!(book.order_count(), 0);
    }

    /// Double-cancel is indistinguishable from single cancel.
    #[test]
    fn cancel_is_idempotent_under_random_books(
        quantities in proptest::collection::vec(1u32..=20, 1..10)
    ) {
        let book = OrderBook::new(SYMBOL);
        for (i, quantity) in quantities.iter().enumerate() {
            let order = Order {
                id: i as u64 + 1,
                side: Side::Buy,
                kind: OrderKind::Limit,
                price: BASE_PRICE - i as i64,
                quantity: *quantity,
                timestamp: i as u64 + 1,
                symbol: Symbol::new(SYMBOL),
            };
            book.add_order(order).unwrap();
        }

        let target = 1u64;
        prop_assert!(book.cancel_order(target).is_some());
        let after_first = book.order_count();
        prop_assert!(book.cancel_order(target).is_none());
        prop_assert_eq!(book.order_count(), after_first);
    }
}
