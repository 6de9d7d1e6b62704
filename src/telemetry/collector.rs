//! Telemetry collector: per-operation latency, operation counters and the
//! merged metrics record.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use super::probes::HostProbes;
use crate::orderbook::types::Metrics;
use crate::utils::current_time_ns;

/// Number of uniform histogram buckets.
pub const HISTOGRAM_BUCKETS: usize = 50;

/// Upper bound of the histogram range in nanoseconds (1 ms); samples at or
/// beyond it land in the last bucket.
pub const MAX_HISTOGRAM_LATENCY_NS: u64 = 1_000_000;

/// Thread-safe accumulator for engine and host telemetry.
///
/// The hot-path entry points (`record_latency` and the counters) are plain
/// atomics. Host sampling happens inside [`TelemetryCollector::get_metrics`]
/// on the metrics publisher's cadence and never blocks the matching thread.
/// Readers may observe counters one sample ahead of the derived averages;
/// the metrics channel is advisory and this is accepted.
pub struct TelemetryCollector {
    orders_processed: AtomicU32,
    trades_executed: AtomicU32,
    trades_dropped: AtomicU64,

    total_latency_ns: AtomicU64,
    latency_samples: AtomicU32,
    min_latency_ns: AtomicU64,
    max_latency_ns: AtomicU64,
    latency_histogram: [AtomicU32; HISTOGRAM_BUCKETS],

    probes: Mutex<HostProbes>,
}

impl TelemetryCollector {
    /// Creates a collector with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders_processed: AtomicU32::new(0),
            trades_executed: AtomicU32::new(0),
            trades_dropped: AtomicU64::new(0),
            total_latency_ns: AtomicU64::new(0),
            latency_samples: AtomicU32::new(0),
            min_latency_ns: AtomicU64::new(u64::MAX),
            max_latency_ns: AtomicU64::new(0),
            latency_histogram: std::array::from_fn(|_| AtomicU32::new(0)),
            probes: Mutex::new(HostProbes::new()),
        }
    }

    /// Record one order-handling latency sample.
    pub fn record_latency(&self, latency_ns: u64) {
        self.total_latency_ns.fetch_add(latency_ns, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);

        let mut current = self.min_latency_ns.load(Ordering::Relaxed);
        while latency_ns < current {
            match self.min_latency_ns.compare_exchange_weak(
                current,
                latency_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }

        let mut current = self.max_latency_ns.load(Ordering::Relaxed);
        while latency_ns > current {
            match self.max_latency_ns.compare_exchange_weak(
                current,
                latency_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }

        let bucket = bucket_index(latency_ns);
        self.latency_histogram[bucket].fetch_add(1, Ordering::Relaxed);
    }

    /// Count one admitted order.
    pub fn increment_orders_processed(&self) {
        self.orders_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one executed trade.
    pub fn increment_trades_executed(&self) {
        self.trades_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one trade dropped because the trade ring was full.
    pub fn increment_trades_dropped(&self) {
        self.trades_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Total trades dropped on ring overflow since engine start.
    #[must_use]
    pub fn trades_dropped(&self) -> u64 {
        self.trades_dropped.load(Ordering::Relaxed)
    }

    /// Snapshot of the latency histogram bucket counts.
    #[must_use]
    pub fn latency_histogram(&self) -> [u64; HISTOGRAM_BUCKETS] {
        std::array::from_fn(|i| self.latency_histogram[i].load(Ordering::Relaxed) as u64)
    }

    /// Merge counters, derived latency statistics and fresh host samples
    /// into one metrics record.
    ///
    /// Polls the host probes, so call this from the metrics publisher
    /// cadence rather than the matching thread.
    #[must_use]
    pub fn get_metrics(&self) -> Metrics {
        let (cpu_usage, memory_usage_bytes, network) = {
            let mut probes = self.probes.lock().unwrap_or_else(PoisonError::into_inner);
            (
                probes.sample_cpu(),
                probes.sample_memory(),
                probes.sample_network(),
            )
        };

        let samples = self.latency_samples.load(Ordering::Relaxed);
        let (avg_latency_ns, min_latency_ns, max_latency_ns) = if samples > 0 {
            (
                self.total_latency_ns.load(Ordering::Relaxed) / samples as u64,
                self.min_latency_ns.load(Ordering::Relaxed),
                self.max_latency_ns.load(Ordering::Relaxed),
            )
        } else {
            (0, 0, 0)
        };

        Metrics {
            timestamp: current_time_ns(),
            cpu_usage,
            memory_usage_bytes,
            network_bytes_sent: network.0,
            network_bytes_recv: network.1,
            orders_processed: self.orders_processed.load(Ordering::Relaxed),
            trades_executed: self.trades_executed.load(Ordering::Relaxed),
            avg_latency_ns,
            max_latency_ns,
            min_latency_ns,
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform bucket over [0, 1 ms); everything slower lands in the last
/// bucket.
fn bucket_index(latency_ns: u64) -> usize {
    if latency_ns >= MAX_HISTOGRAM_LATENCY_NS {
        return HISTOGRAM_BUCKETS - 1;
    }
    let bucket = (latency_ns as u128 * HISTOGRAM_BUCKETS as u128
        / MAX_HISTOGRAM_LATENCY_NS as u128) as usize;
    bucket.min(HISTOGRAM_BUCKETS - 1)
}
