use crate::models::{Trade, TradeId, TradeStatus};

/// Bounded storage for trade lifecycle tracking.
///
/// Slots are addressed by index-based `TradeId`s. When full, the oldest
/// trade that is no longer awaiting an acknowledgment is recycled, keeping
/// memory bounded over long runs. A `Submitted` slot is never recycled.
#[derive(Debug)]
pub struct TradeArena {
    trades: Vec<Trade>,
    capacity: usize,
}

impl TradeArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            trades: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Store a trade, returning its slot id. Returns `None` only when every
    /// slot holds an unacknowledged submission, which the single in-flight
    /// rule prevents in practice.
    pub fn insert(&mut self, trade: Trade) -> Option<TradeId> {
        if self.trades.len() < self.capacity {
            self.trades.push(trade);
            return Some(TradeId(self.trades.len() - 1));
        }

        let slot = self
            .trades
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status != TradeStatus::Submitted)
            .min_by_key(|(_, t)| t.opened_at)
            .map(|(i, _)| i)?;

        self.trades[slot] = trade;
        Some(TradeId(slot))
    }

    pub fn get(&self, id: TradeId) -> Option<&Trade> {
        self.trades.get(id.0)
    }

    pub fn set_status(&mut self, id: TradeId, status: TradeStatus) -> bool {
        match self.trades.get_mut(id.0) {
            Some(trade) => {
                trade.status = status;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TradeId, &Trade)> {
        self.trades.iter().enumerate().map(|(i, t)| (TradeId(i), t))
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}
