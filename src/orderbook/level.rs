//! A single price level: the FIFO queue of live orders resting at one price.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::types::{Order, OrderId, Price, Quantity};

/// All orders resting at one price on one side, in arrival order.
///
/// The aggregate quantity is kept in an atomic alongside the queue so point
/// reads (`total_quantity`, `order_count`) never need the queue lock held by
/// a snapshot in progress. Structural mutation happens only under the book's
/// write guard, so the queue lock is uncontended in practice.
#[derive(Debug)]
pub struct PriceLevel {
    price: Price,
    total_quantity: AtomicU64,
    orders: RwLock<VecDeque<Order>>,
}

impl PriceLevel {
    /// Creates an empty level at `price`.
    #[must_use]
    pub fn new(price: Price) -> Self {
        Self {
            price,
            total_quantity: AtomicU64::new(0),
            orders: RwLock::new(VecDeque::new()),
        }
    }

    /// The price shared by every order at this level.
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Sum of the remaining quantities of all queued orders.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.total_quantity.load(Ordering::Acquire)
    }

    /// Number of orders queued at this level.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.read_queue().len()
    }

    /// Copy of the order at the front of the FIFO queue, if any.
    #[must_use]
    pub fn front_order(&self) -> Option<Order> {
        self.read_queue().front().copied()
    }

    /// Appends `order` at the back of the queue (loses to every earlier
    /// arrival at this price).
    pub(super) fn push_order(&self, order: Order) {
        let quantity = order.quantity as u64;
        self.write_queue().push_back(order);
        self.total_quantity.fetch_add(quantity, Ordering::AcqRel);
    }

    /// Removes the order with `id` from anywhere in the queue.
    pub(super) fn remove_order(&self, id: OrderId) -> Option<Order> {
        let removed = {
            let mut queue = self.write_queue();
            let position = queue.iter().position(|o| o.id == id)?;
            queue.remove(position)
        }?;
        self.total_quantity
            .fetch_sub(removed.quantity as u64, Ordering::AcqRel);
        Some(removed)
    }

    /// Fills `quantity` against the front order. The caller must ensure
    /// `quantity` does not exceed the front order's remaining quantity.
    ///
    /// Returns the front order after the fill and whether it was fully
    /// filled (and therefore popped from the queue).
    pub(super) fn fill_front(&self, quantity: Quantity) -> Option<(Order, bool)> {
        let (order, filled) = {
            let mut queue = self.write_queue();
            let front = queue.front_mut()?;
            front.quantity -= quantity;
            let filled = front.quantity == 0;
            let order = *front;
            if filled {
                queue.pop_front();
            }
            (order, filled)
        };
        self.total_quantity
            .fetch_sub(quantity as u64, Ordering::AcqRel);
        Some((order, filled))
    }

    fn read_queue(&self) -> RwLockReadGuard<'_, VecDeque<Order>> {
        self.orders.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_queue(&self) -> RwLockWriteGuard<'_, VecDeque<Order>> {
        self.orders.write().unwrap_or_else(PoisonError::into_inner)
    }
}
