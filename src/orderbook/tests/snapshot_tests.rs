//! Snapshot capture and derived top-of-book queries.

use super::test_helpers::{limit_order, TEST_SYMBOL};
use crate::orderbook::{OrderBook, Side, MAX_BOOK_LEVELS};

#[test]
fn test_snapshot_orders_levels_correctly() {
    let book = OrderBook::new(TEST_SYMBOL);
    book.add_order(limit_order(1, Side::Buy, 9_998, 5, 1)).unwrap();
    book.add_order(limit_order(2, Side::Buy, 10_000, 3, 2)).unwrap();
    book.add_order(limit_order(3, Side::Buy, 9_999, 2, 3)).unwrap();
    book.add_order(limit_order(4, Side::Sell, 10_002, 4, 4)).unwrap();
    book.add_order(limit_order(5, Side::Sell, 10_001, 6, 5)).unwrap();

    let snap = book.get_snapshot();
    assert_eq!(snap.symbol.as_str(), TEST_SYMBOL);
    assert!(snap.timestamp > 0);

    // Bids descending.
    assert_eq!(snap.bid_count, 3);
    let bid_prices: Vec<i64> = snap.bids[..3].iter().map(|l| l.price).collect();
    assert_eq!(bid_prices, vec![10_000, 9_999, 9_998]);

    // Asks ascending.
    assert_eq!(snap.ask_count, 2);
    let ask_prices: Vec<i64> = snap.asks[..2].iter().map(|l| l.price).collect();
    assert_eq!(ask_prices, vec![10_001, 10_002]);
}

#[test]
fn test_snapshot_aggregates_per_level() {
    let book = OrderBook::new(TEST_SYMBOL);
    book.add_order(limit_order(1, Side::Buy, 10_000, 5, 1)).unwrap();
    book.add_order(limit_order(2, Side::Buy, 10_000, 7, 2)).unwrap();

    let snap = book.get_snapshot();
    assert_eq!(snap.bid_count, 1);
    assert_eq!(snap.bids[0].quantity, 12);
    assert_eq!(snap.bids[0].order_count, 2);
    assert_eq!(snap.total_bid_volume(), 12);
}

#[test]
fn test_snapshot_truncates_to_max_levels() {
    let book = OrderBook::new(TEST_SYMBOL);
    for i in 0..30i64 {
        book.add_order(limit_order(i as u64 + 1, Side::Buy, 9_000 - i, 1, i as u64 + 1)).unwrap();
    }

    let snap = book.get_snapshot();
    assert_eq!(snap.bid_count as usize, MAX_BOOK_LEVELS);
    // Best 20 levels survive: 9000 down to 8981.
    assert_eq!(snap.bids[0].price, 9_000);
    assert_eq!(snap.bids[MAX_BOOK_LEVELS - 1].price, 8_981);
}

#[test]
fn test_empty_book_queries_return_zero() {
    let book = OrderBook::new(TEST_SYMBOL);
    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), None);
    assert_eq!(book.mid_price(), 0.0);
    assert_eq!(book.spread(), 0);

    let snap = book.get_snapshot();
    assert_eq!(snap.bid_count, 0);
    assert_eq!(snap.ask_count, 0);
    assert_eq!(snap.mid_price(), 0.0);
}

#[test]
fn test_mid_price_and_spread() {
    let book = OrderBook::new(TEST_SYMBOL);
    book.add_order(limit_order(1, Side::Buy, 9_990, 5, 1)).unwrap();
    book.add_order(limit_order(2, Side::Sell, 10_010, 5, 2)).unwrap();

    assert_eq!(book.mid_price(), 10_000.0);
    assert_eq!(book.spread(), 20);

    // One-sided book reads as zero.
    book.cancel_order(2);
    assert_eq!(book.mid_price(), 0.0);
    assert_eq!(book.spread(), 0);
}

#[test]
fn test_snapshot_reflects_fills() {
    let book = OrderBook::new(TEST_SYMBOL);
    book.add_order(limit_order(1, Side::Buy, 10_000, 5, 1)).unwrap();
    book.add_order(limit_order(2, Side::Sell, 10_000, 3, 2)).unwrap();

    let snap = book.get_snapshot();
    assert_eq!(snap.bid_count, 1);
    assert_eq!(snap.bids[0].quantity, 2);
    assert_eq!(snap.bids[0].order_count, 1);
    assert_eq!(snap.ask_count, 0);
}
