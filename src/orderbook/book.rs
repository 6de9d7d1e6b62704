//! Core OrderBook implementation for a single symbol.

use crossbeam::atomic::AtomicCell;
use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

use super::level::PriceLevel;
use super::trade::TradeListener;
use super::types::{OrderId, Price, Side, Symbol};

/// Where a live order rests: its side and (effective) price identify the
/// level; the order's position within the level is its FIFO slot.
#[derive(Debug, Clone, Copy)]
pub(super) struct OrderLocation {
    /// The level price the order was booked under. For market orders this
    /// is the extremal matching price, not the submitted price.
    pub price: Price,
    /// The side the order rests on.
    pub side: Side,
}

/// The order book manages a collection of price levels for both bid and ask
/// sides of one symbol, matching incoming orders with price-time priority.
///
/// # Concurrency
///
/// The sides are concurrent ordered maps (skip lists) and the order index is
/// a concurrent hash map, so point reads such as [`OrderBook::best_bid`] are
/// lock-free from any thread. Structural mutation (`add_order`,
/// `cancel_order`, `modify_order`) and [`OrderBook::get_snapshot`] serialise
/// on `write_guard`, a brief mutex: one thread drives admission while the
/// snapshot publisher reads, and the guard is what makes each snapshot
/// self-consistent across levels.
pub struct OrderBook {
    /// The symbol this book trades.
    pub(super) symbol: Symbol,

    /// Bid side price levels (buy orders). SkipMap keeps prices sorted
    /// ascending, so the best bid is the last entry.
    pub(super) bids: SkipMap<Price, Arc<PriceLevel>>,

    /// Ask side price levels (sell orders). The best ask is the first entry.
    pub(super) asks: SkipMap<Price, Arc<PriceLevel>>,

    /// Map from order id to the (price, side) the order rests under. An
    /// entry is present iff the order is live.
    pub(super) order_index: DashMap<OrderId, OrderLocation>,

    /// Serialises structural mutation and full-book snapshots. Held for the
    /// whole of each operation so the matcher always runs to fixpoint before
    /// anyone else observes the book.
    pub(super) write_guard: Mutex<()>,

    /// The last price at which a trade occurred.
    last_trade_price: AtomicCell<Price>,

    /// Whether any trade has occurred yet.
    has_traded: AtomicBool,

    /// Invoked synchronously on the matching thread for every execution.
    pub trade_listener: Option<TradeListener>,
}

impl OrderBook {
    /// Create a new order book for the given symbol.
    #[must_use]
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            bids: SkipMap::new(),
            asks: SkipMap::new(),
            order_index: DashMap::new(),
            write_guard: Mutex::new(()),
            last_trade_price: AtomicCell::new(0),
            has_traded: AtomicBool::new(false),
            trade_listener: None,
        }
    }

    /// Create a new order book with a trade listener installed.
    #[must_use]
    pub fn with_trade_listener(symbol: &str, trade_listener: TradeListener) -> Self {
        let mut book = Self::new(symbol);
        book.trade_listener = Some(trade_listener);
        book
    }

    /// Set the trade listener for this order book.
    pub fn set_trade_listener(&mut self, trade_listener: TradeListener) {
        self.trade_listener = Some(trade_listener);
    }

    /// Remove the trade listener from this order book.
    pub fn remove_trade_listener(&mut self) {
        self.trade_listener = None;
    }

    /// The symbol of this order book.
    #[must_use]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Get the best bid price, if any.
    ///
    /// Lock-free: reads the skip list tail directly.
    #[must_use]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.iter().next_back().map(|entry| *entry.key())
    }

    /// Get the best ask price, if any.
    ///
    /// Lock-free: reads the skip list head directly.
    #[must_use]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.iter().next().map(|entry| *entry.key())
    }

    /// Mid price (average of best bid and best ask); zero when either side
    /// is empty.
    #[must_use]
    pub fn mid_price(&self) -> f64 {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ((bid as i128 + ask as i128) as f64) / 2.0,
            _ => 0.0,
        }
    }

    /// Spread (best ask minus best bid); zero when either side is empty.
    #[must_use]
    pub fn spread(&self) -> Price {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.saturating_sub(bid),
            _ => 0,
        }
    }

    /// The last price at which a trade occurred, if any.
    #[must_use]
    pub fn last_trade_price(&self) -> Option<Price> {
        if self.has_traded.load(Ordering::Relaxed) {
            Some(self.last_trade_price.load())
        } else {
            None
        }
    }

    /// Number of live orders across both sides.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.order_index.len()
    }

    /// Whether the order with `id` is currently live.
    #[must_use]
    pub fn contains_order(&self, id: OrderId) -> bool {
        self.order_index.contains_key(&id)
    }

    /// Whether both sides of the book are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Total resting quantity on one side, summed over its levels.
    #[must_use]
    pub fn total_quantity_on(&self, side: Side) -> u64 {
        let levels = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        levels
            .iter()
            .map(|entry| entry.value().total_quantity())
            .sum()
    }

    /// Number of price levels on one side.
    #[must_use]
    pub fn level_count(&self, side: Side) -> usize {
        match side {
            Side::Buy => self.bids.len(),
            Side::Sell => self.asks.len(),
        }
    }

    pub(super) fn record_trade_price(&self, price: Price) {
        self.last_trade_price.store(price);
        self.has_traded.store(true, Ordering::Relaxed);
        trace!("book {}: last trade price {}", self.symbol, price);
    }

    pub(super) fn lock_structure(&self) -> MutexGuard<'_, ()> {
        self.write_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
