//! Core value types shared between the matching engine and the
//! shared-memory channels.
//!
//! Everything that crosses the process boundary (`Trade`, `BookLevel`,
//! `BookSnapshot`, `Metrics`) is `#[repr(C)]` with explicit padding so the
//! byte layout is fixed and identical for every process that maps the
//! regions. Prices are signed 64-bit integers in minor units (cents);
//! quantities are unsigned 32-bit; identifiers are unsigned 64-bit;
//! timestamps are nanoseconds since the Unix epoch.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::utils::current_time_ns;

/// Price in minor units (e.g. cents).
pub type Price = i64;

/// Order quantity in units.
pub type Quantity = u32;

/// Submitter-chosen order identifier, unique among live orders.
pub type OrderId = u64;

/// Maximum number of price levels captured per side in a snapshot.
pub const MAX_BOOK_LEVELS: usize = 20;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Buy (bid) side.
    Buy = 0,
    /// Sell (ask) side.
    Sell = 1,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order execution kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OrderKind {
    /// Executes immediately against available liquidity; unfilled residue is
    /// discarded, never rested.
    Market = 0,
    /// Executes at the stated price or better; residue rests on the book.
    Limit = 1,
    /// Declared for wire compatibility; rejected on submission until trigger
    /// logic exists.
    Stop = 2,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => write!(f, "MARKET"),
            OrderKind::Limit => write!(f, "LIMIT"),
            OrderKind::Stop => write!(f, "STOP"),
        }
    }
}

/// Fixed 16-byte, NUL-padded ASCII instrument symbol.
///
/// This is the exact field downstream processes read out of shared memory,
/// so it is a plain byte array rather than a heap string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Symbol([u8; 16]);

impl Symbol {
    /// Builds a symbol from a string, truncating to 15 bytes and NUL-padding
    /// the remainder.
    #[must_use]
    pub fn new(s: &str) -> Self {
        let mut bytes = [0u8; 16];
        let n = s.len().min(15);
        bytes[..n].copy_from_slice(&s.as_bytes()[..n]);
        Self(bytes)
    }

    /// Returns the symbol as a string slice, stopping at the first NUL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(16);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }

    /// Returns the raw 16-byte field.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol::new(&s))
    }
}

/// A live order. Mutated only by the engine: `quantity` is the remaining
/// (unfilled) quantity and decrements on fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Submitter-chosen unique identifier.
    pub id: OrderId,
    /// Buy or Sell.
    pub side: Side,
    /// Market, Limit or Stop.
    pub kind: OrderKind,
    /// Limit price in minor units.
    pub price: Price,
    /// Remaining quantity.
    pub quantity: Quantity,
    /// Arrival timestamp in nanoseconds; establishes time priority.
    pub timestamp: u64,
    /// Instrument symbol.
    pub symbol: Symbol,
}

impl Order {
    /// Creates an order stamped with the current arrival time.
    #[must_use]
    pub fn new(
        id: OrderId,
        side: Side,
        kind: OrderKind,
        price: Price,
        quantity: Quantity,
        symbol: Symbol,
    ) -> Self {
        Self {
            id,
            side,
            kind,
            price,
            quantity,
            timestamp: current_time_ns(),
            symbol,
        }
    }
}

/// A single execution between a buy and a sell order.
///
/// Wire layout (56 bytes): `buy_order_id` | `sell_order_id` | `price` |
/// `quantity` | `reserved` | `timestamp` | `symbol[16]`. The `reserved`
/// field makes the alignment padding after `quantity` explicit so the
/// struct has no hidden bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(C)]
pub struct Trade {
    /// Identifier of the buy-side order.
    pub buy_order_id: OrderId,
    /// Identifier of the sell-side order.
    pub sell_order_id: OrderId,
    /// Execution price in minor units (the resting order's price).
    pub price: Price,
    /// Executed quantity.
    pub quantity: Quantity,
    /// Layout padding; always zero.
    pub reserved: u32,
    /// Execution timestamp in nanoseconds.
    pub timestamp: u64,
    /// Instrument symbol.
    pub symbol: Symbol,
}

impl Trade {
    /// Creates a trade record with the padding field zeroed.
    #[must_use]
    pub fn new(
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        price: Price,
        quantity: Quantity,
        timestamp: u64,
        symbol: Symbol,
    ) -> Self {
        Self {
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            reserved: 0,
            timestamp,
            symbol,
        }
    }
}

/// One aggregated price level in a snapshot (16 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(C)]
pub struct BookLevel {
    /// Level price in minor units.
    pub price: Price,
    /// Aggregate quantity resting at this price.
    pub quantity: Quantity,
    /// Number of orders queued at this price.
    pub order_count: u32,
}

/// Point-in-time summary of the top [`MAX_BOOK_LEVELS`] levels per side
/// (672 bytes).
///
/// Bids are ordered by descending price, asks by ascending price; only the
/// first `bid_count` / `ask_count` array entries are meaningful.
#[derive(Debug, Clone, Copy, Serialize)]
#[repr(C)]
pub struct BookSnapshot {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Capture timestamp in nanoseconds.
    pub timestamp: u64,
    /// Bid levels, best (highest price) first.
    pub bids: [BookLevel; MAX_BOOK_LEVELS],
    /// Ask levels, best (lowest price) first.
    pub asks: [BookLevel; MAX_BOOK_LEVELS],
    /// Number of populated bid levels.
    pub bid_count: u32,
    /// Number of populated ask levels.
    pub ask_count: u32,
}

impl BookSnapshot {
    /// Creates an empty snapshot for `symbol` captured at `timestamp`.
    #[must_use]
    pub fn empty(symbol: Symbol, timestamp: u64) -> Self {
        Self {
            symbol,
            timestamp,
            bids: [BookLevel::default(); MAX_BOOK_LEVELS],
            asks: [BookLevel::default(); MAX_BOOK_LEVELS],
            bid_count: 0,
            ask_count: 0,
        }
    }

    /// Returns the best bid level, if any.
    #[must_use]
    pub fn best_bid(&self) -> Option<BookLevel> {
        (self.bid_count > 0).then(|| self.bids[0])
    }

    /// Returns the best ask level, if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<BookLevel> {
        (self.ask_count > 0).then(|| self.asks[0])
    }

    /// Mid price across the populated top of book; zero when either side is
    /// empty.
    #[must_use]
    pub fn mid_price(&self) -> f64 {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => (bid.price as f64 + ask.price as f64) / 2.0,
            _ => 0.0,
        }
    }

    /// Spread in minor units; zero when either side is empty.
    #[must_use]
    pub fn spread(&self) -> Price {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.price.saturating_sub(bid.price),
            _ => 0,
        }
    }

    /// Total quantity across the populated bid levels.
    #[must_use]
    pub fn total_bid_volume(&self) -> u64 {
        self.bids[..self.bid_count as usize]
            .iter()
            .map(|l| l.quantity as u64)
            .sum()
    }

    /// Total quantity across the populated ask levels.
    #[must_use]
    pub fn total_ask_volume(&self) -> u64 {
        self.asks[..self.ask_count as usize]
            .iter()
            .map(|l| l.quantity as u64)
            .sum()
    }
}

/// Combined engine and host telemetry record (72 bytes, no padding).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[repr(C)]
pub struct Metrics {
    /// Capture timestamp in nanoseconds.
    pub timestamp: u64,
    /// Host CPU usage in tenths of a percent (0–1000).
    pub cpu_usage: f64,
    /// Resident set size of this process in bytes.
    pub memory_usage_bytes: u64,
    /// Bytes sent on non-loopback interfaces since the previous sample.
    pub network_bytes_sent: u64,
    /// Bytes received on non-loopback interfaces since the previous sample.
    pub network_bytes_recv: u64,
    /// Total orders admitted since engine start.
    pub orders_processed: u32,
    /// Total trades executed since engine start.
    pub trades_executed: u32,
    /// Mean order-handling latency in nanoseconds (0 until first sample).
    pub avg_latency_ns: u64,
    /// Maximum observed latency in nanoseconds.
    pub max_latency_ns: u64,
    /// Minimum observed latency in nanoseconds (0 until first sample).
    pub min_latency_ns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    #[test]
    fn test_wire_layout_sizes_are_fixed() {
        assert_eq!(size_of::<BookLevel>(), 16);
        assert_eq!(size_of::<Trade>(), 56);
        assert_eq!(size_of::<BookSnapshot>(), 672);
        assert_eq!(size_of::<Metrics>(), 72);
        assert_eq!(size_of::<Symbol>(), 16);
    }

    #[test]
    fn test_wire_alignment_is_word_sized() {
        assert_eq!(align_of::<Trade>(), 8);
        assert_eq!(align_of::<BookSnapshot>(), 8);
        assert_eq!(align_of::<Metrics>(), 8);
    }

    #[test]
    fn test_symbol_round_trip_and_truncation() {
        let s = Symbol::new("BTCUSD");
        assert_eq!(s.as_str(), "BTCUSD");
        assert_eq!(&s.as_bytes()[6..], &[0u8; 10]);

        let long = Symbol::new("ABCDEFGHIJKLMNOPQRSTU");
        assert_eq!(long.as_str().len(), 15);
        assert_eq!(long.as_bytes()[15], 0);
    }

    #[test]
    fn test_symbol_serializes_as_string() {
        let s = Symbol::new("ETHUSD");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"ETHUSD\"");
    }

    #[test]
    fn test_order_new_stamps_arrival_time() {
        let order = Order::new(7, Side::Buy, OrderKind::Limit, 10_000, 5, Symbol::new("BTCUSD"));
        assert!(order.timestamp > 0);
        assert_eq!(order.quantity, 5);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_empty_snapshot_reads_as_zero() {
        let snap = BookSnapshot::empty(Symbol::new("BTCUSD"), 1);
        assert_eq!(snap.best_bid(), None);
        assert_eq!(snap.best_ask(), None);
        assert_eq!(snap.mid_price(), 0.0);
        assert_eq!(snap.spread(), 0);
        assert_eq!(snap.total_bid_volume(), 0);
    }
}
