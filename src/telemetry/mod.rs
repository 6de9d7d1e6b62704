//! Telemetry collection: operation latency, counters and host resource
//! probes, merged into the metrics record the engine publishes.

pub mod collector;
pub mod probes;

pub use collector::{TelemetryCollector, HISTOGRAM_BUCKETS, MAX_HISTOGRAM_LATENCY_NS};
pub use probes::HostProbes;
