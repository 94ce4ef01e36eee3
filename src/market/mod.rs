use std::collections::VecDeque;

use crate::error::EngineError;
use crate::models::PriceBar;

/// Bounded, ordered history of price bars for the single traded instrument.
///
/// Append-only with a single writer (the controller); the oldest bar is
/// evicted when the window is at capacity. Capacity must be at least the
/// longest indicator lookback plus one, which config validation enforces.
#[derive(Debug)]
pub struct MarketWindow {
    bars: VecDeque<PriceBar>,
    capacity: usize,
}

impl MarketWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            bars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a bar, evicting the oldest when at capacity.
    pub fn append(&mut self, bar: PriceBar) {
        if self.bars.len() == self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
    }

    /// The last `n` bars in chronological order.
    pub fn snapshot(&self, n: usize) -> Result<Vec<PriceBar>, EngineError> {
        if n > self.bars.len() {
            return Err(EngineError::InsufficientData {
                needed: n,
                have: self.bars.len(),
            });
        }
        Ok(self.bars.iter().skip(self.bars.len() - n).cloned().collect())
    }

    /// All bars currently held, oldest first.
    pub fn bars(&self) -> Vec<PriceBar> {
        self.bars.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.back()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
