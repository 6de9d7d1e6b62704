//! # Matchbook
//!
//! A single-symbol limit-order matching engine paired with a lock-free
//! shared-memory telemetry fabric. The engine owns one symbol's book,
//! matches with price-time priority, and multicasts book snapshots,
//! execution reports and system metrics to out-of-process consumers
//! (streaming gateways, UIs, archivers) through fixed-layout shared-memory
//! regions.
//!
//! ## Architecture
//!
//! Three components compose the core, leaves first:
//!
//! 1. **[`shm`]**: named shared-memory regions carrying three channels:
//!    a latest-wins *snapshot slot*, a latest-wins *metrics slot*, and a
//!    bounded SPSC *trade ring*. Publication is wait-free; readers validate
//!    every observation against a sequence or ring index, so a torn value
//!    is discarded rather than trusted.
//! 2. **[`orderbook`]**: the matching engine, with price-ordered levels on each
//!    side, FIFO queues within a level, and a matcher that runs to fixpoint
//!    after every admission, emitting trades through a synchronous
//!    listener.
//! 3. **[`telemetry`]**: per-operation latency (min/avg/max plus a
//!    50-bucket histogram), operation counters, and host CPU/memory/network
//!    probes sampled off the hot path.
//!
//! The **[`harness`]** wires them together in one process: the caller's
//! thread admits orders, a snapshot publisher and a metrics publisher
//! republish state at fixed cadences, and the trade listener streams
//! executions into the ring.
//!
//! ## Concurrency model
//!
//! One thread admits orders and drives matching. The book's sides and
//! order index are concurrent structures, so point reads are lock-free;
//! structural mutation and full snapshots serialise on a brief mutex,
//! which is what makes every published snapshot self-consistent. The trade
//! listener runs on the matching thread and performs only a lock-free ring
//! push and atomic counter increments.
//!
//! ## Example
//!
//! ```no_run
//! use matchbook_rs::harness::{EngineHarness, HarnessConfig};
//! use matchbook_rs::orderbook::{Order, OrderKind, Side, Symbol};
//!
//! let mut harness = EngineHarness::start(HarnessConfig::default())?;
//! let symbol = harness.book().symbol();
//!
//! harness.submit_order(Order::new(1, Side::Buy, OrderKind::Limit, 1_000_000, 5, symbol))?;
//! harness.submit_order(Order::new(2, Side::Sell, OrderKind::Limit, 1_000_000, 5, symbol))?;
//!
//! harness.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod feed;
pub mod harness;
pub mod orderbook;
pub mod prelude;
pub mod shm;
pub mod telemetry;
mod utils;

pub use feed::{FeedMessage, MetricsMessage, OrderbookMessage, TradeMessage};
pub use harness::{EngineHarness, HarnessConfig, HarnessError};
pub use orderbook::{
    BookLevel, BookSnapshot, Metrics, Order, OrderBook, OrderBookError, OrderId, OrderKind, Price,
    Quantity, Side, Symbol, Trade, TradeListener, MAX_BOOK_LEVELS,
};
pub use shm::{
    SeqSlot, SharedBookSlot, SharedMetricsSlot, SharedRegion, SharedTradeRing, ShmError,
    TradeRing, METRICS_REGION, ORDERBOOK_REGION, TRADES_REGION, TRADE_RING_ENTRIES,
};
pub use telemetry::{TelemetryCollector, HISTOGRAM_BUCKETS};
pub use utils::current_time_ns;
