use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLC price bar. Immutable once appended to the market window.
///
/// `open` is optional because the broker tick stream only carries a quote;
/// bars synthesized from quotes have no meaningful open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub timestamp: DateTime<Utc>,
}

/// Trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

/// Which rule produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRule {
    Breakout,
    Trend,
}

/// A directional decision from the signal generator.
///
/// Absence of a signal is modeled as `Option<Signal>` so a "none" decision
/// never carries a bogus source rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub direction: Direction,
    pub source_rule: SourceRule,
}

/// Indicator values recomputed per tick from the current window.
/// Never persisted.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorSnapshot {
    pub atr: f64,
    pub sma50: f64,
    pub sma200: f64,
}

/// Lifecycle of a single trade slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Submitted,
    Filled,
    Rejected,
    Closed,
}

impl TradeStatus {
    /// Terminal states free their arena slot for reuse.
    pub fn is_finished(&self) -> bool {
        matches!(self, TradeStatus::Rejected | TradeStatus::Closed)
    }
}

/// A trade created on successful gating. Status transitions are driven by
/// execution-sink acknowledgments.
#[derive(Debug, Clone)]
pub struct Trade {
    pub direction: Direction,
    pub lot_size: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub opened_at: DateTime<Utc>,
    pub status: TradeStatus,
}

/// Order request sent to the broker order channel.
///
/// `stop_loss`/`take_profit` are omitted from the serialized frame entirely
/// when stealth mode is enabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRequest {
    pub side: Direction,
    pub symbol: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
}

/// Identifier of a trade slot in the bounded arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TradeId(pub usize);

impl std::fmt::Display for TradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single incoming price update for the instrument.
#[derive(Debug, Clone)]
pub struct TickEvent {
    pub symbol: String,
    pub quote: f64,
    pub timestamp: DateTime<Utc>,
}

/// Unified inbound event stream consumed by the controller, strictly in
/// arrival order.
#[derive(Debug, Clone)]
pub enum Event {
    Tick(TickEvent),
    Balance { balance: f64 },
    Authorized,
    OrderAck { trade_id: TradeId, accepted: bool },
    DayBoundary { day: NaiveDate },
}
