use chrono::{DateTime, Utc};

use crate::models::Direction;

/// One executed trade, as recorded by the audit sink.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLogEntry {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub lot_size: f64,
}

/// Append-only record of executed trades. Durable storage is an external
/// collaborator; this crate only defines the seam.
pub trait TradeLog: Send {
    fn record(&mut self, entry: TradeLogEntry);
}

/// Default sink: emits each executed trade through tracing.
pub struct TracingTradeLog;

impl TradeLog for TracingTradeLog {
    fn record(&mut self, entry: TradeLogEntry) {
        tracing::info!(
            timestamp = %entry.timestamp,
            direction = ?entry.direction,
            lot_size = entry.lot_size,
            "trade executed"
        );
    }
}

/// In-memory log for tests and inspection.
#[derive(Default)]
pub struct MemoryTradeLog {
    pub entries: Vec<TradeLogEntry>,
}

impl TradeLog for MemoryTradeLog {
    fn record(&mut self, entry: TradeLogEntry) {
        self.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_log_is_append_only() {
        let mut log = MemoryTradeLog::default();
        log.record(TradeLogEntry {
            timestamp: Utc::now(),
            direction: Direction::Buy,
            lot_size: 4.0,
        });
        log.record(TradeLogEntry {
            timestamp: Utc::now(),
            direction: Direction::Sell,
            lot_size: 2.0,
        });

        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[0].direction, Direction::Buy);
        assert_eq!(log.entries[1].direction, Direction::Sell);
    }
}
