use crate::config::BotConfig;
use crate::indicators::{atr, closes, sma};
use crate::models::{Direction, IndicatorSnapshot, PriceBar, Signal, SourceRule};

/// Combines the breakout and trend rules into a single directional decision.
///
/// Rules are evaluated in priority order and the first match wins. A window
/// too short for a rule's indicators suppresses the signal rather than
/// raising an error.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    pub atr_period: usize,
    pub sma_short: usize,
    pub sma_long: usize,
    /// Breakout proximity factor: fire when the close is within
    /// `breakout_factor * ATR` of a recent extreme.
    pub breakout_factor: f64,
}

/// Outcome of one evaluation. Exactly one signal per evaluation; the ATR that
/// backed the decision rides along for sizing and stop placement.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub signal: Signal,
    pub atr: f64,
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self {
            atr_period: 14,
            sma_short: 50,
            sma_long: 200,
            breakout_factor: 0.2,
        }
    }
}

impl SignalGenerator {
    pub fn from_config(cfg: &BotConfig) -> Self {
        Self {
            atr_period: cfg.atr_period,
            sma_short: cfg.sma_short,
            sma_long: cfg.sma_long,
            breakout_factor: cfg.breakout_factor,
        }
    }

    /// Recompute the indicator snapshot for the current window.
    /// Requires enough bars for all three indicators.
    pub fn indicator_snapshot(
        &self,
        bars: &[PriceBar],
    ) -> crate::Result<IndicatorSnapshot> {
        let price_closes = closes(bars);
        Ok(IndicatorSnapshot {
            atr: atr(bars, self.atr_period)?,
            sma50: sma(&price_closes, self.sma_short)?,
            sma200: sma(&price_closes, self.sma_long)?,
        })
    }

    /// Evaluate the rules against the window, oldest bar first.
    pub fn evaluate(&self, bars: &[PriceBar]) -> Option<Evaluation> {
        let last = bars.last()?;

        // Breakout first: needs only the ATR lookback
        let current_atr = match atr(bars, self.atr_period) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("signal suppressed: {}", e);
                return None;
            }
        };

        if let Some(direction) = self.breakout_direction(bars, last.close, current_atr) {
            return Some(Evaluation {
                signal: Signal {
                    direction,
                    source_rule: SourceRule::Breakout,
                },
                atr: current_atr,
            });
        }

        // Trend-following fallback: needs the long moving average
        let direction = match self.trend_direction(bars, last.close) {
            Ok(d) => d?,
            Err(e) => {
                tracing::debug!("signal suppressed: {}", e);
                return None;
            }
        };

        Some(Evaluation {
            signal: Signal {
                direction,
                source_rule: SourceRule::Trend,
            },
            atr: current_atr,
        })
    }

    fn breakout_direction(
        &self,
        bars: &[PriceBar],
        close: f64,
        current_atr: f64,
    ) -> Option<Direction> {
        // Extremes over the same trailing lookback the ATR uses
        let recent = &bars[bars.len() - self.atr_period..];
        let recent_high = recent.iter().fold(f64::MIN, |max, b| max.max(b.high));
        let recent_low = recent.iter().fold(f64::MAX, |min, b| min.min(b.low));

        if close > recent_high - self.breakout_factor * current_atr {
            Some(Direction::Buy)
        } else if close < recent_low + self.breakout_factor * current_atr {
            Some(Direction::Sell)
        } else {
            None
        }
    }

    fn trend_direction(
        &self,
        bars: &[PriceBar],
        close: f64,
    ) -> crate::Result<Option<Direction>> {
        let price_closes = closes(bars);
        let short = sma(&price_closes, self.sma_short)?;
        let long = sma(&price_closes, self.sma_long)?;

        if close > short && short > long {
            Ok(Some(Direction::Buy))
        } else if close < short && short < long {
            Ok(Some(Direction::Sell))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn bar(high: f64, low: f64, close: f64, i: usize) -> PriceBar {
        PriceBar {
            open: None,
            high,
            low,
            close,
            timestamp: Utc::now() + Duration::minutes(i as i64),
        }
    }

    /// Bars oscillating in a tight band so no breakout fires, with closes
    /// rising slowly enough that close > sma50 > sma200.
    fn uptrend_bars(count: usize) -> Vec<PriceBar> {
        (0..count)
            .map(|i| {
                let close = 100.0 + i as f64 * 0.05;
                // Wide range keeps ATR large relative to the drift, so the
                // close stays well inside the breakout band
                bar(close + 5.0, close - 5.0, close, i)
            })
            .collect()
    }

    #[test]
    fn test_no_signal_on_short_window() {
        let generator = SignalGenerator::default();
        let bars = uptrend_bars(10);
        assert!(generator.evaluate(&bars).is_none());
    }

    #[test]
    fn test_trend_buy_on_250_bar_uptrend() {
        let generator = SignalGenerator::default();
        let bars = uptrend_bars(250);

        let eval = generator.evaluate(&bars).expect("expected a signal");
        assert_eq!(eval.signal.direction, Direction::Buy);
        assert_eq!(eval.signal.source_rule, SourceRule::Trend);
    }

    #[test]
    fn test_trend_sell_on_downtrend() {
        let generator = SignalGenerator::default();
        let bars: Vec<PriceBar> = (0..250)
            .map(|i| {
                let close = 200.0 - i as f64 * 0.05;
                bar(close + 5.0, close - 5.0, close, i)
            })
            .collect();

        let eval = generator.evaluate(&bars).expect("expected a signal");
        assert_eq!(eval.signal.direction, Direction::Sell);
        assert_eq!(eval.signal.source_rule, SourceRule::Trend);
    }

    #[test]
    fn test_breakout_buy_takes_priority_over_trend() {
        let generator = SignalGenerator::default();
        let mut bars = uptrend_bars(250);
        // Final close punches through the recent high
        let i = bars.len() - 1;
        let high = bars[i].high;
        bars[i] = bar(high + 3.0, bars[i].low, high + 3.0, i);

        let eval = generator.evaluate(&bars).expect("expected a signal");
        assert_eq!(eval.signal.direction, Direction::Buy);
        assert_eq!(eval.signal.source_rule, SourceRule::Breakout);
    }

    #[test]
    fn test_breakout_sell_near_recent_low() {
        let generator = SignalGenerator::default();
        let mut bars = uptrend_bars(250);
        let i = bars.len() - 1;
        let low = bars[i].low;
        bars[i] = bar(bars[i].high, low - 3.0, low - 3.0, i);

        let eval = generator.evaluate(&bars).expect("expected a signal");
        assert_eq!(eval.signal.direction, Direction::Sell);
        assert_eq!(eval.signal.source_rule, SourceRule::Breakout);
    }

    #[test]
    fn test_breakout_fires_before_long_ma_is_ready() {
        // 20 bars: enough for ATR(14) but nowhere near SMA200
        let generator = SignalGenerator::default();
        let mut bars = uptrend_bars(20);
        let i = bars.len() - 1;
        let high = bars[i].high;
        bars[i] = bar(high + 3.0, bars[i].low, high + 3.0, i);

        let eval = generator.evaluate(&bars).expect("expected a signal");
        assert_eq!(eval.signal.source_rule, SourceRule::Breakout);
    }

    #[test]
    fn test_no_signal_in_sideways_market() {
        let generator = SignalGenerator::default();
        // Alternate closes around 100 so neither rule lines up
        let bars: Vec<PriceBar> = (0..250)
            .map(|i| {
                let close = if i % 2 == 0 { 99.5 } else { 100.5 };
                bar(105.0, 95.0, close, i)
            })
            .collect();

        assert!(generator.evaluate(&bars).is_none());
    }

    #[test]
    fn test_snapshot_matches_component_indicators() {
        let generator = SignalGenerator::default();
        let bars = uptrend_bars(250);

        let snapshot = generator.indicator_snapshot(&bars).unwrap();
        assert!(snapshot.atr > 0.0);
        assert!(snapshot.sma50 > snapshot.sma200);
    }
}
