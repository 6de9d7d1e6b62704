//! JSON projection of the shared-memory channels.
//!
//! The out-of-process bridge reads shared memory and emits these messages
//! to browsers; the bridge itself lives outside this crate, but the shapes
//! and unit conversions are pinned here so every consumer divides prices by
//! the same 100 and the CPU gauge by the same 10.

use serde::Serialize;

use crate::orderbook::types::{BookSnapshot, Metrics, Trade};

/// Minor units per major price unit (cents per dollar).
const PRICE_SCALE: f64 = 100.0;

/// One message on the downstream feed, tagged by `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedMessage {
    /// Top-of-book snapshot.
    Orderbook(OrderbookMessage),
    /// One execution from the trade ring.
    Trade(TradeMessage),
    /// Telemetry record.
    Metrics(MetricsMessage),
}

impl FeedMessage {
    /// Serialize to the wire JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `{"type":"orderbook", ...}` with levels as `[price_major, qty, orders]`
/// triples.
#[derive(Debug, Clone, Serialize)]
pub struct OrderbookMessage {
    /// Instrument symbol.
    pub symbol: String,
    /// Capture timestamp in nanoseconds.
    pub timestamp: u64,
    /// Bid levels, best first.
    pub bids: Vec<(f64, u32, u32)>,
    /// Ask levels, best first.
    pub asks: Vec<(f64, u32, u32)>,
}

impl From<&BookSnapshot> for OrderbookMessage {
    fn from(snapshot: &BookSnapshot) -> Self {
        let project = |levels: &[crate::orderbook::types::BookLevel]| -> Vec<(f64, u32, u32)> {
            levels
                .iter()
                .map(|l| (l.price as f64 / PRICE_SCALE, l.quantity, l.order_count))
                .collect()
        };
        Self {
            symbol: snapshot.symbol.as_str().to_string(),
            timestamp: snapshot.timestamp,
            bids: project(&snapshot.bids[..snapshot.bid_count as usize]),
            asks: project(&snapshot.asks[..snapshot.ask_count as usize]),
        }
    }
}

/// `{"type":"trade", ...}` with the price converted to major units.
#[derive(Debug, Clone, Serialize)]
pub struct TradeMessage {
    /// Instrument symbol.
    pub symbol: String,
    /// Execution price in major units.
    pub price: f64,
    /// Executed quantity.
    pub quantity: u32,
    /// Execution timestamp in nanoseconds.
    pub timestamp: u64,
    /// Identifier of the buy-side order.
    pub buy_order_id: u64,
    /// Identifier of the sell-side order.
    pub sell_order_id: u64,
}

impl From<&Trade> for TradeMessage {
    fn from(trade: &Trade) -> Self {
        Self {
            symbol: trade.symbol.as_str().to_string(),
            price: trade.price as f64 / PRICE_SCALE,
            quantity: trade.quantity,
            timestamp: trade.timestamp,
            buy_order_id: trade.buy_order_id,
            sell_order_id: trade.sell_order_id,
        }
    }
}

/// `{"type":"metrics", ...}`. The wire CPU gauge is tenths of a percent,
/// so the feed divides by 10 to report percent.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsMessage {
    /// Capture timestamp in nanoseconds.
    pub timestamp: u64,
    /// Host CPU usage in percent.
    pub cpu_usage: f64,
    /// Resident set size in bytes.
    pub memory_usage: u64,
    /// Bytes sent since the previous sample.
    pub network_sent: u64,
    /// Bytes received since the previous sample.
    pub network_recv: u64,
    /// Orders admitted since engine start.
    pub orders_processed: u32,
    /// Trades executed since engine start.
    pub trades_executed: u32,
    /// Mean handling latency in nanoseconds.
    pub avg_latency_ns: u64,
    /// Minimum handling latency in nanoseconds.
    pub min_latency_ns: u64,
    /// Maximum handling latency in nanoseconds.
    pub max_latency_ns: u64,
}

impl From<&Metrics> for MetricsMessage {
    fn from(metrics: &Metrics) -> Self {
        Self {
            timestamp: metrics.timestamp,
            cpu_usage: metrics.cpu_usage / 10.0,
            memory_usage: metrics.memory_usage_bytes,
            network_sent: metrics.network_bytes_sent,
            network_recv: metrics.network_bytes_recv,
            orders_processed: metrics.orders_processed,
            trades_executed: metrics.trades_executed,
            avg_latency_ns: metrics.avg_latency_ns,
            min_latency_ns: metrics.min_latency_ns,
            max_latency_ns: metrics.max_latency_ns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::types::{BookLevel, Symbol};

    #[test]
    fn test_trade_message_converts_price_to_major_units() {
        let trade = Trade::new(1, 2, 1_234_500, 7, 99, Symbol::new("BTCUSD"));
        let message = FeedMessage::Trade(TradeMessage::from(&trade));
        let json: serde_json::Value =
            serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "trade");
        assert_eq!(json["symbol"], "BTCUSD");
        assert_eq!(json["price"], 12_345.0);
        assert_eq!(json["quantity"], 7);
        assert_eq!(json["buy_order_id"], 1);
        assert_eq!(json["sell_order_id"], 2);
    }

    #[test]
    fn test_orderbook_message_projects_populated_levels_only() {
        let mut snapshot = BookSnapshot::empty(Symbol::new("BTCUSD"), 5);
        snapshot.bids[0] = BookLevel { price: 10_000, quantity: 3, order_count: 2 };
        snapshot.bid_count = 1;

        let message = FeedMessage::Orderbook(OrderbookMessage::from(&snapshot));
        let json: serde_json::Value =
            serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "orderbook");
        assert_eq!(json["bids"], serde_json::json!([[100.0, 3, 2]]));
        assert_eq!(json["asks"], serde_json::json!([]));
    }

    #[test]
    fn test_metrics_message_scales_cpu_to_percent() {
        let metrics = Metrics {
            timestamp: 1,
            cpu_usage: 257.0, // tenths of a percent
            memory_usage_bytes: 4096,
            ..Metrics::default()
        };
        let message = FeedMessage::Metrics(MetricsMessage::from(&metrics));
        let json: serde_json::Value =
            serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "metrics");
        assert_eq!(json["cpu_usage"], 25.7);
        assert_eq!(json["memory_usage"], 4096);
    }
}
