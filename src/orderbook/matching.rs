//! Core matching loop: crosses the top of book until quiescent.

use std::sync::Arc;
use tracing::trace;

use super::book::OrderBook;
use super::level::PriceLevel;
use super::types::{Order, Price, Trade};
use crate::utils::current_time_ns;

impl OrderBook {
    /// Repeatedly match the best bid against the best ask until the book no
    /// longer crosses. Called with the structure guard held, after every
    /// admission.
    ///
    /// Each iteration trades the front orders of the two best levels at the
    /// resting (earlier-arrival) order's price for `min` of their remaining
    /// quantities, emits the trade through the listener, and drops whichever
    /// orders and levels were exhausted.
    pub(super) fn match_to_fixpoint(&self) {
        loop {
            let Some((bid_price, bid_level)) = self.best_bid_level() else {
                break;
            };
            let Some((ask_price, ask_level)) = self.best_ask_level() else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            let Some(buy) = bid_level.front_order() else {
                // An empty level violates the book invariant; drop it and
                // re-evaluate rather than spin on it.
                self.bids.remove(&bid_price);
                continue;
            };
            let Some(sell) = ask_level.front_order() else {
                self.asks.remove(&ask_price);
                continue;
            };

            let trade_price = resting_price(&buy, &sell);
            let trade_quantity = buy.quantity.min(sell.quantity);
            let trade = Trade::new(
                buy.id,
                sell.id,
                trade_price,
                trade_quantity,
                current_time_ns(),
                self.symbol,
            );

            if let Some((_, filled)) = bid_level.fill_front(trade_quantity) {
                if filled {
                    self.order_index.remove(&buy.id);
                    if bid_level.order_count() == 0 {
                        self.bids.remove(&bid_price);
                    }
                }
            }
            if let Some((_, filled)) = ask_level.fill_front(trade_quantity) {
                if filled {
                    self.order_index.remove(&sell.id);
                    if ask_level.order_count() == 0 {
                        self.asks.remove(&ask_price);
                    }
                }
            }

            self.record_trade_price(trade_price);
            trace!(
                "book {}: trade {}x{} buy {} sell {}",
                self.symbol, trade_quantity, trade_price, buy.id, sell.id
            );

            if let Some(listener) = &self.trade_listener {
                listener(&trade);
            }
        }
    }

    /// Highest-priced bid level.
    fn best_bid_level(&self) -> Option<(Price, Arc<PriceLevel>)> {
        let entry = self.bids.iter().next_back()?;
        Some((*entry.key(), entry.value().clone()))
    }

    /// Lowest-priced ask level.
    fn best_ask_level(&self) -> Option<(Price, Arc<PriceLevel>)> {
        let entry = self.asks.iter().next()?;
        Some((*entry.key(), entry.value().clone()))
    }
}

/// The trade prints at the resting order's price: whichever arrived
/// earlier. Equal arrival timestamps resolve to the buy order's price,
/// which keeps the rule deterministic.
fn resting_price(buy: &Order, sell: &Order) -> Price {
    if buy.timestamp <= sell.timestamp {
        buy.price
    } else {
        sell.price
    }
}
