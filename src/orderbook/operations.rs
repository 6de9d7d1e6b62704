//! Order book operations: adding, cancelling and modifying orders.

use std::sync::Arc;
use tracing::trace;

use super::book::{OrderBook, OrderLocation};
use super::error::OrderBookError;
use super::level::PriceLevel;
use super::types::{Order, OrderId, OrderKind, Price, Quantity, Side};
use crate::utils::current_time_ns;

impl OrderBook {
    /// Admit an order and run the matcher to fixpoint.
    ///
    /// Zero or more trades are emitted through the trade listener before
    /// this returns; on return the book is quiescent (no bid price crosses
    /// any ask price). Market orders match against an extremal effective
    /// price and any unfilled residue is discarded rather than rested.
    ///
    /// # Errors
    /// - [`OrderBookError::DuplicateOrderId`] if `order.id` is already live.
    /// - [`OrderBookError::UnsupportedOrderKind`] for stop orders, which are
    ///   declared in the wire enum but have no trigger logic yet.
    /// - [`OrderBookError::InvalidQuantity`] for zero-quantity orders.
    pub fn add_order(&self, order: Order) -> Result<(), OrderBookError> {
        let _guard = self.lock_structure();
        self.add_order_locked(order)
    }

    /// Cancel the live order with `id`, returning it. Idempotent: an
    /// unknown id is a no-op and returns `None`. No matching is triggered.
    pub fn cancel_order(&self, id: OrderId) -> Option<Order> {
        let _guard = self.lock_structure();
        self.remove_order_locked(id)
    }

    /// Replace the live order with `id` by one with `new_price` and
    /// `new_quantity`, preserving side, kind and symbol but resetting the
    /// arrival timestamp, so the order loses its queue priority.
    ///
    /// Returns `Ok(false)` without touching the book when `id` is unknown.
    ///
    /// # Errors
    /// Propagates the re-admission errors of [`OrderBook::add_order`]
    /// (e.g. [`OrderBookError::InvalidQuantity`] when `new_quantity` is 0;
    /// the original order is gone in that case, matching cancel-then-add).
    pub fn modify_order(
        &self,
        id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> Result<bool, OrderBookError> {
        let _guard = self.lock_structure();

        let Some(existing) = self.remove_order_locked(id) else {
            return Ok(false);
        };

        let mut replacement = existing;
        replacement.price = new_price;
        replacement.quantity = new_quantity;
        replacement.timestamp = current_time_ns();

        trace!(
            "book {}: modify order {} -> price {} qty {}",
            self.symbol, id, new_price, new_quantity
        );
        self.add_order_locked(replacement)?;
        Ok(true)
    }

    /// Cancel every live order, leaving both sides empty.
    ///
    /// Returns the number of orders removed.
    pub fn cancel_all_orders(&self) -> usize {
        let _guard = self.lock_structure();
        let ids: Vec<OrderId> = self.order_index.iter().map(|entry| *entry.key()).collect();
        let mut removed = 0;
        for id in ids {
            if self.remove_order_locked(id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    fn add_order_locked(&self, mut order: Order) -> Result<(), OrderBookError> {
        if matches!(order.kind, OrderKind::Stop) {
            return Err(OrderBookError::UnsupportedOrderKind {
                id: order.id,
                kind: order.kind,
            });
        }
        if order.quantity == 0 {
            return Err(OrderBookError::InvalidQuantity { id: order.id });
        }
        if self.order_index.contains_key(&order.id) {
            return Err(OrderBookError::DuplicateOrderId { id: order.id });
        }

        // Market orders match at an extremal price so they sweep the
        // opposite side; the residue never survives to rest at it.
        if matches!(order.kind, OrderKind::Market) {
            order.price = match order.side {
                Side::Buy => Price::MAX,
                Side::Sell => Price::MIN,
            };
        }

        let book_side = match order.side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        let level = book_side
            .get_or_insert(order.price, Arc::new(PriceLevel::new(order.price)))
            .value()
            .clone();
        level.push_order(order);
        self.order_index.insert(
            order.id,
            OrderLocation {
                price: order.price,
                side: order.side,
            },
        );

        trace!(
            "book {}: add order {} {} {} {}@{}",
            self.symbol, order.id, order.side, order.kind, order.quantity, order.price
        );

        self.match_to_fixpoint();

        if matches!(order.kind, OrderKind::Market) && self.order_index.contains_key(&order.id) {
            // Unfilled market residue is discarded, never rested.
            let _ = self.remove_order_locked(order.id);
            trace!(
                "book {}: discarded unfilled market residue for order {}",
                self.symbol, order.id
            );
        }

        Ok(())
    }

    pub(super) fn remove_order_locked(&self, id: OrderId) -> Option<Order> {
        let (_, location) = self.order_index.remove(&id)?;
        let book_side = match location.side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };

        let level = book_side.get(&location.price)?.value().clone();
        let removed = level.remove_order(id);
        if level.order_count() == 0 {
            book_side.remove(&location.price);
        }

        if removed.is_some() {
            trace!("book {}: removed order {}", self.symbol, id);
        }
        removed
    }
}
