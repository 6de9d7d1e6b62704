//! Prelude module that re-exports commonly used types.
//!
//! ```rust
//! use matchbook_rs::prelude::*;
//! ```

// Core order book types
pub use crate::orderbook::{Order, OrderBook, OrderBookError, TradeListener};

// Value and wire types
pub use crate::orderbook::types::{
    BookLevel, BookSnapshot, Metrics, OrderId, OrderKind, Price, Quantity, Side, Symbol, Trade,
    MAX_BOOK_LEVELS,
};

// Shared-memory channels
pub use crate::shm::{
    SharedBookSlot, SharedMetricsSlot, SharedRegion, SharedTradeRing, ShmError, METRICS_REGION,
    ORDERBOOK_REGION, TRADES_REGION,
};

// Telemetry
pub use crate::telemetry::TelemetryCollector;

// Harness
pub use crate::harness::{EngineHarness, HarnessConfig, HarnessError};

// Feed projection
pub use crate::feed::FeedMessage;

// Utility functions
pub use crate::utils::current_time_ns;
