//! Snapshot capture: the top-of-book summary published over shared memory.

use super::book::OrderBook;
use super::types::{BookLevel, BookSnapshot, MAX_BOOK_LEVELS};
use crate::utils::current_time_ns;

impl OrderBook {
    /// Capture a self-consistent snapshot of up to [`MAX_BOOK_LEVELS`]
    /// levels per side: bids by descending price, asks by ascending price,
    /// each with its aggregate quantity and order count.
    ///
    /// Takes the structure guard, so a snapshot never observes a book in
    /// the middle of a matching pass.
    #[must_use]
    pub fn get_snapshot(&self) -> BookSnapshot {
        let _guard = self.lock_structure();
        let mut snapshot = BookSnapshot::empty(self.symbol, current_time_ns());

        for (i, entry) in self.bids.iter().rev().take(MAX_BOOK_LEVELS).enumerate() {
            let level = entry.value();
            snapshot.bids[i] = BookLevel {
                price: *entry.key(),
                quantity: clamped_quantity(level.total_quantity()),
                order_count: level.order_count() as u32,
            };
            snapshot.bid_count = (i + 1) as u32;
        }

        for (i, entry) in self.asks.iter().take(MAX_BOOK_LEVELS).enumerate() {
            let level = entry.value();
            snapshot.asks[i] = BookLevel {
                price: *entry.key(),
                quantity: clamped_quantity(level.total_quantity()),
                order_count: level.order_count() as u32,
            };
            snapshot.ask_count = (i + 1) as u32;
        }

        snapshot
    }
}

/// The wire field is u32; an aggregate past that saturates rather than
/// wraps.
fn clamped_quantity(total: u64) -> u32 {
    total.min(u32::MAX as u64) as u32
}
