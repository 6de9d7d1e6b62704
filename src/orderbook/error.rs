//! Order book error types

use std::fmt;

use super::types::{OrderId, OrderKind};

/// Errors that can occur within the order book.
#[derive(Debug)]
#[non_exhaustive]
pub enum OrderBookError {
    /// An order with this identifier is already live. The caller must not
    /// retry with the same id.
    DuplicateOrderId {
        /// The rejected order's identifier.
        id: OrderId,
    },

    /// The order kind is not accepted by the matching engine. Stop orders
    /// are declared in the wire enum but rejected until trigger logic
    /// exists.
    UnsupportedOrderKind {
        /// The rejected order's identifier.
        id: OrderId,
        /// The kind that was rejected.
        kind: OrderKind,
    },

    /// The order carried a zero quantity, which would violate the
    /// strictly-positive level aggregate invariant.
    InvalidQuantity {
        /// The rejected order's identifier.
        id: OrderId,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::DuplicateOrderId { id } => {
                write!(f, "duplicate order id: {id} is already live")
            }
            OrderBookError::UnsupportedOrderKind { id, kind } => {
                write!(f, "unsupported order kind {kind} for order {id}")
            }
            OrderBookError::InvalidQuantity { id } => {
                write!(f, "invalid quantity: order {id} has zero quantity")
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
