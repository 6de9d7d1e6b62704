//! Host-level resource probes backed by procfs.
//!
//! Polled from the metrics publisher cadence, never from the matching hot
//! path. Each probe keeps the previous raw reading so it can publish
//! deltas; a failed read publishes zero and warns once.

use std::fs;
use tracing::warn;

/// Stateful samplers for CPU, memory and network usage.
#[derive(Debug, Default)]
pub struct HostProbes {
    last_cpu_total: u64,
    last_cpu_idle: u64,
    last_bytes_sent: u64,
    last_bytes_recv: u64,
    cpu_warned: bool,
    memory_warned: bool,
    network_warned: bool,
}

impl HostProbes {
    /// Creates probes with no history; the first sample of each delta-based
    /// probe is measured against zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU usage as tenths of a percent (0–1000): the non-idle share of the
    /// jiffies elapsed since the previous sample.
    pub fn sample_cpu(&mut self) -> f64 {
        match read_cpu_jiffies() {
            Some((total, idle)) => {
                let total_diff = total.saturating_sub(self.last_cpu_total);
                let idle_diff = idle.saturating_sub(self.last_cpu_idle);
                self.last_cpu_total = total;
                self.last_cpu_idle = idle;

                if total_diff > 0 {
                    (1000.0 * (total_diff.saturating_sub(idle_diff)) as f64) / total_diff as f64
                } else {
                    0.0
                }
            }
            None => {
                if !self.cpu_warned {
                    warn!("failed to read /proc/stat; reporting cpu usage as 0");
                    self.cpu_warned = true;
                }
                0.0
            }
        }
    }

    /// Resident set size of this process in bytes.
    pub fn sample_memory(&mut self) -> u64 {
        match read_rss_bytes() {
            Some(bytes) => bytes,
            None => {
                if !self.memory_warned {
                    warn!("failed to read /proc/self/status; reporting memory usage as 0");
                    self.memory_warned = true;
                }
                0
            }
        }
    }

    /// Bytes (sent, received) across all non-loopback interfaces since the
    /// previous sample.
    pub fn sample_network(&mut self) -> (u64, u64) {
        match read_network_totals() {
            Some((sent, recv)) => {
                let delta_sent = sent.saturating_sub(self.last_bytes_sent);
                let delta_recv = recv.saturating_sub(self.last_bytes_recv);
                self.last_bytes_sent = sent;
                self.last_bytes_recv = recv;
                (delta_sent, delta_recv)
            }
            None => {
                if !self.network_warned {
                    warn!("failed to read /proc/net/dev; reporting network deltas as 0");
                    self.network_warned = true;
                }
                (0, 0)
            }
        }
    }
}

/// Parses the aggregate cpu line of `/proc/stat` into (total, idle)
/// jiffies, where idle includes iowait.
fn read_cpu_jiffies() -> Option<(u64, u64)> {
    let stat = fs::read_to_string("/proc/stat").ok()?;
    let line = stat.lines().next()?;
    let mut fields = line.split_whitespace();
    if fields.next()? != "cpu" {
        return None;
    }

    let values: Vec<u64> = fields.filter_map(|f| f.parse().ok()).collect();
    // user nice system idle iowait irq softirq steal
    if values.len() < 8 {
        return None;
    }
    let idle = values[3] + values[4];
    let total: u64 = values[..8].iter().sum();
    Some((total, idle))
}

/// Reads `VmRSS` from `/proc/self/status`, in bytes.
fn read_rss_bytes() -> Option<u64> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

/// Sums cumulative (sent, received) bytes across non-loopback interfaces
/// from `/proc/net/dev`.
fn read_network_totals() -> Option<(u64, u64)> {
    let dev = fs::read_to_string("/proc/net/dev").ok()?;
    let mut total_sent = 0u64;
    let mut total_recv = 0u64;

    // The first two lines are headers; each data line is
    // `iface: recv_bytes ... (8 fields) ... sent_bytes ...`.
    for line in dev.lines().skip(2) {
        let Some((interface, counters)) = line.split_once(':') else {
            continue;
        };
        if interface.trim() == "lo" {
            continue;
        }
        let fields: Vec<u64> = counters
            .split_whitespace()
            .filter_map(|f| f.parse().ok())
            .collect();
        if fields.len() < 9 {
            continue;
        }
        total_recv = total_recv.saturating_add(fields[0]);
        total_sent = total_sent.saturating_add(fields[8]);
    }

    Some((total_sent, total_recv))
}
