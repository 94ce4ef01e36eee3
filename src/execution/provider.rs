use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::EngineError;
use crate::models::PriceBar;

/// Historical-bar data source queried before each evaluation.
///
/// Implementations must return at least `lookback` bars in chronological
/// order, or fail with `InsufficientData`.
pub trait BarProvider: Send {
    fn fetch(&mut self, symbol: &str, lookback: usize) -> Result<Vec<PriceBar>, EngineError>;
}

/// Seeded random-walk bar source for dry runs and demos.
///
/// Keeps its own cursor so consecutive fetches extend the same walk instead
/// of replaying it.
pub struct SyntheticBarProvider {
    rng: StdRng,
    price: f64,
    history: Vec<PriceBar>,
    next_timestamp: DateTime<Utc>,
    interval: Duration,
}

impl SyntheticBarProvider {
    pub fn new(seed: u64, base_price: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            price: base_price,
            history: Vec::new(),
            next_timestamp: Utc::now(),
            interval: Duration::minutes(1),
        }
    }

    fn generate_bar(&mut self) -> PriceBar {
        let open = self.price;
        // ±0.5% drift per bar with a wick on each side
        let drift: f64 = self.rng.gen_range(-0.005..0.005);
        let close = open * (1.0 + drift);
        let wick: f64 = self.rng.gen_range(0.0005..0.003);
        let high = open.max(close) * (1.0 + wick);
        let low = open.min(close) * (1.0 - wick);

        let bar = PriceBar {
            open: Some(open),
            high,
            low,
            close,
            timestamp: self.next_timestamp,
        };

        self.price = close;
        self.next_timestamp += self.interval;
        bar
    }

    fn extend_to(&mut self, len: usize) {
        while self.history.len() < len {
            let bar = self.generate_bar();
            self.history.push(bar);
        }
    }

    /// Keep the retained history bounded over long runs; the walk state
    /// itself lives in `price`/`rng`, not in the buffer.
    fn trim_to(&mut self, keep: usize) {
        if self.history.len() > 2 * keep {
            let cut = self.history.len() - keep;
            self.history.drain(..cut);
        }
    }
}

impl BarProvider for SyntheticBarProvider {
    fn fetch(&mut self, _symbol: &str, lookback: usize) -> Result<Vec<PriceBar>, EngineError> {
        // Advance the walk by one bar per fetch, backfilling on first use
        self.extend_to(self.history.len().max(lookback) + 1);

        let start = self.history.len() - lookback;
        let bars = self.history[start..].to_vec();
        self.trim_to(lookback);
        Ok(bars)
    }
}
