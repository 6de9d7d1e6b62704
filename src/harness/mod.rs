//! Engine harness: wires the order book, the telemetry collector and the
//! shared-memory channels into one running process.
//!
//! The harness owns the three regions, installs the trade listener that
//! feeds the trade ring, and runs two publisher threads: the snapshot
//! publisher (100 µs cadence by default) and the metrics publisher (100 ms
//! cadence by default). The caller's thread is the single admission thread
//! and drives matching through [`EngineHarness::submit_order`].

pub mod error;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::orderbook::{Order, OrderBook, OrderBookError, Trade};
use crate::shm::{
    SharedBookSlot, SharedMetricsSlot, SharedRegion, SharedTradeRing, METRICS_REGION,
    ORDERBOOK_REGION, TRADES_REGION,
};
use crate::telemetry::TelemetryCollector;

pub use error::HarnessError;

/// Harness configuration. [`HarnessConfig::default`] carries the production
/// constants; tests override the region names and cadences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// The instrument the engine trades.
    pub symbol: String,
    /// Region name of the snapshot channel.
    pub orderbook_region: String,
    /// Region name of the metrics channel.
    pub metrics_region: String,
    /// Region name of the trade ring.
    pub trades_region: String,
    /// Snapshot publisher cadence.
    pub snapshot_interval: Duration,
    /// Metrics publisher cadence.
    pub metrics_interval: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSD".to_string(),
            orderbook_region: ORDERBOOK_REGION.to_string(),
            metrics_region: METRICS_REGION.to_string(),
            trades_region: TRADES_REGION.to_string(),
            snapshot_interval: Duration::from_micros(100),
            metrics_interval: Duration::from_millis(100),
        }
    }
}

/// The running engine process: book + telemetry + publication.
pub struct EngineHarness {
    book: Arc<OrderBook>,
    telemetry: Arc<TelemetryCollector>,
    config: HarnessConfig,
    running: Arc<AtomicBool>,
    publishers: Vec<JoinHandle<()>>,
    // Regions are held so the mappings outlive the publisher threads; the
    // names are unlinked on stop().
    snapshot_region: Arc<SharedRegion<SharedBookSlot>>,
    metrics_region: Arc<SharedRegion<SharedMetricsSlot>>,
    trades_region: Arc<SharedRegion<SharedTradeRing>>,
}

impl EngineHarness {
    /// Create the shared-memory regions, wire the trade listener and start
    /// the publisher threads.
    ///
    /// # Errors
    /// Region creation and thread spawning are fatal: the harness refuses
    /// to start and any regions already created are unlinked again.
    pub fn start(config: HarnessConfig) -> Result<Self, HarnessError> {
        let snapshot_region =
            Arc::new(SharedRegion::<SharedBookSlot>::create(&config.orderbook_region)?);
        let metrics_region = match SharedRegion::<SharedMetricsSlot>::create(&config.metrics_region)
        {
            Ok(region) => Arc::new(region),
            Err(err) => {
                unlink_quietly(&config.orderbook_region);
                return Err(err.into());
            }
        };
        let trades_region = match SharedRegion::<SharedTradeRing>::create(&config.trades_region) {
            Ok(region) => Arc::new(region),
            Err(err) => {
                unlink_quietly(&config.orderbook_region);
                unlink_quietly(&config.metrics_region);
                return Err(err.into());
            }
        };

        let telemetry = Arc::new(TelemetryCollector::new());

        // The listener runs on the matching thread: one lock-free ring push
        // plus counter increments, nothing that can block the matcher.
        let listener = {
            let ring = Arc::clone(&trades_region);
            let telemetry = Arc::clone(&telemetry);
            Arc::new(move |trade: &Trade| {
                if !ring.get().push(trade) {
                    telemetry.increment_trades_dropped();
                    debug!(
                        "trade ring full; dropped trade buy={} sell={}",
                        trade.buy_order_id, trade.sell_order_id
                    );
                }
                telemetry.increment_trades_executed();
            })
        };
        let book = Arc::new(OrderBook::with_trade_listener(&config.symbol, listener));

        let running = Arc::new(AtomicBool::new(true));
        let mut harness = Self {
            book,
            telemetry,
            config,
            running,
            publishers: Vec::with_capacity(2),
            snapshot_region,
            metrics_region,
            trades_region,
        };
        harness.spawn_publishers()?;

        info!(
            "engine harness started for {} (snapshot every {:?}, metrics every {:?})",
            harness.config.symbol, harness.config.snapshot_interval, harness.config.metrics_interval
        );
        Ok(harness)
    }

    fn spawn_publishers(&mut self) -> Result<(), HarnessError> {
        let snapshot_publisher = {
            let running = Arc::clone(&self.running);
            let book = Arc::clone(&self.book);
            let region = Arc::clone(&self.snapshot_region);
            let interval = self.config.snapshot_interval;
            thread::Builder::new()
                .name("snapshot-publisher".to_string())
                .spawn(move || {
                    while running.load(Ordering::Relaxed) {
                        let snapshot = book.get_snapshot();
                        region.get().publish(&snapshot);
                        thread::sleep(interval);
                    }
                })
                .map_err(|e| HarnessError::ThreadSpawn {
                    name: "snapshot-publisher".to_string(),
                    message: e.to_string(),
                })?
        };
        self.publishers.push(snapshot_publisher);

        let metrics_publisher = {
            let running = Arc::clone(&self.running);
            let telemetry = Arc::clone(&self.telemetry);
            let region = Arc::clone(&self.metrics_region);
            let interval = self.config.metrics_interval;
            thread::Builder::new()
                .name("metrics-publisher".to_string())
                .spawn(move || {
                    while running.load(Ordering::Relaxed) {
                        let metrics = telemetry.get_metrics();
                        region.get().publish(&metrics);
                        thread::sleep(interval);
                    }
                })
                .map_err(|e| HarnessError::ThreadSpawn {
                    name: "metrics-publisher".to_string(),
                    message: e.to_string(),
                })?
        };
        self.publishers.push(metrics_publisher);
        Ok(())
    }

    /// Admit one order: stamp, match, record latency, count.
    ///
    /// Call from a single admission thread; the book serialises structural
    /// mutation regardless, but ordering guarantees assume one admitter.
    ///
    /// # Errors
    /// Propagates rejection from [`OrderBook::add_order`] (duplicate id,
    /// unsupported kind, zero quantity). Rejected orders are not counted as
    /// processed, but their handling latency is still recorded.
    pub fn submit_order(&self, order: Order) -> Result<(), OrderBookError> {
        let started = Instant::now();
        let result = self.book.add_order(order);
        self.telemetry
            .record_latency(started.elapsed().as_nanos() as u64);
        if result.is_ok() {
            self.telemetry.increment_orders_processed();
        }
        result
    }

    /// The order book driven by this harness.
    #[must_use]
    pub fn book(&self) -> &Arc<OrderBook> {
        &self.book
    }

    /// The telemetry collector fed by this harness.
    #[must_use]
    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        &self.telemetry
    }

    /// Whether the publishers are still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stop the publishers, join them and unlink the region names.
    /// Idempotent.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }

        for handle in self.publishers.drain(..) {
            if handle.join().is_err() {
                warn!("a publisher thread panicked before shutdown");
            }
        }

        unlink_quietly(&self.config.orderbook_region);
        unlink_quietly(&self.config.metrics_region);
        unlink_quietly(&self.config.trades_region);
        info!("engine harness stopped for {}", self.config.symbol);
    }
}

impl Drop for EngineHarness {
    fn drop(&mut self) {
        self.stop();
    }
}

fn unlink_quietly(name: &str) {
    if let Err(err) = crate::shm::region::unlink(name) {
        warn!("failed to unlink shared memory region {}: {}", name, err);
    }
}
