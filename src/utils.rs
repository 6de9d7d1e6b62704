//! Small shared utilities.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time as nanoseconds since the Unix epoch.
///
/// Arrival timestamps, trade timestamps and snapshot timestamps all use this
/// clock so that downstream consumers can display them directly. Latency
/// measurements use [`std::time::Instant`] deltas instead, which stay
/// monotonic across wall-clock adjustments.
pub fn current_time_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_time_ns_is_nonzero_and_monotonic_enough() {
        let a = current_time_ns();
        let b = current_time_ns();
        assert!(a > 0);
        assert!(b >= a);
    }
}
