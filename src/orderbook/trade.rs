//! Trade emission: the callback type the engine drives on every match.

use std::sync::Arc;

use super::types::Trade;

/// Trade listener specification using Arc for shared ownership.
///
/// The listener runs synchronously on the matching thread, once per
/// execution, in exact match order. It must be cheap and must not panic:
/// the engine does not catch unwinds, so a throwing listener takes the
/// matching thread down with it. The harness installs a listener that only
/// performs a lock-free ring push and atomic counter increments.
pub type TradeListener = Arc<dyn Fn(&Trade) + Send + Sync>;
