//! Shared-Memory Channel Set: lock-free publication channels over named
//! shared memory.
//!
//! Three channels connect the engine to out-of-process consumers:
//!
//! - the *snapshot slot* (latest-wins book snapshot),
//! - the *metrics slot* (latest-wins telemetry record),
//! - the *trade ring* (bounded SPSC trade stream).
//!
//! Exactly one producer writes each region; readers validate every
//! observation through the slot sequence or the ring indices, so a crash
//! mid-publication at worst loses the value in flight.

pub mod error;
pub mod region;
pub mod ring;
pub mod slot;

pub use error::ShmError;
pub use region::{unlink, SharedRegion};
pub use ring::{SharedTradeRing, TradeRing, TRADE_RING_ENTRIES};
pub use slot::{SeqSlot, SharedBookSlot, SharedMetricsSlot};

/// Region name of the book snapshot channel.
pub const ORDERBOOK_REGION: &str = "/hft_orderbook";

/// Region name of the metrics channel.
pub const METRICS_REGION: &str = "/hft_metrics";

/// Region name of the trade stream channel.
pub const TRADES_REGION: &str = "/hft_trades";
