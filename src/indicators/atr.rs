/// Average True Range (ATR)
///
/// True Range per bar is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Current Low - Previous Close)
///
/// ATR here is the arithmetic mean of the trailing `period` true ranges.
use crate::error::EngineError;
use crate::models::PriceBar;

fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    let mut ranges = Vec::with_capacity(bars.len().saturating_sub(1));
    for i in 1..bars.len() {
        let high = bars[i].high;
        let low = bars[i].low;
        let prev_close = bars[i - 1].close;

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());
        ranges.push(tr);
    }
    ranges
}

/// ATR over the trailing `period` bars. Requires `period + 1` bars because
/// the first true range needs a previous close.
pub fn atr(bars: &[PriceBar], period: usize) -> Result<f64, EngineError> {
    if bars.len() < period + 1 {
        return Err(EngineError::InsufficientData {
            needed: period + 1,
            have: bars.len(),
        });
    }

    let ranges = true_ranges(bars);
    let sum: f64 = ranges.iter().rev().take(period).sum();
    Ok(sum / period as f64)
}

/// Mean of the `lookback` ATR values preceding the current one, each an
/// arithmetic mean over `period` true ranges. The current ATR is excluded
/// so a spike cannot inflate its own baseline.
pub fn average_atr(bars: &[PriceBar], period: usize, lookback: usize) -> Result<f64, EngineError> {
    let needed = period + lookback;
    if bars.len() < needed + 1 {
        return Err(EngineError::InsufficientData {
            needed: needed + 1,
            have: bars.len(),
        });
    }

    let ranges = true_ranges(bars);
    let mut sum = 0.0;
    for offset in 1..=lookback {
        let end = ranges.len() - offset;
        let window = &ranges[end - period..end];
        sum += window.iter().sum::<f64>() / period as f64;
    }
    Ok(sum / lookback as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_bars(prices: &[(f64, f64, f64)]) -> Vec<PriceBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &(high, low, close))| PriceBar {
                open: None,
                high,
                low,
                close,
                timestamp: Utc::now() + chrono::Duration::minutes(i as i64),
            })
            .collect()
    }

    #[test]
    fn test_atr_flat_market() {
        // Constant 2-point range, close equal to mid: every TR is 2.0
        let bars = create_test_bars(&vec![(101.0, 99.0, 100.0); 15]);
        let atr = atr(&bars, 14).unwrap();
        assert!((atr - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_atr_uses_gap_from_previous_close() {
        let mut prices = vec![(101.0, 99.0, 100.0); 14];
        // Gap up: high - prev_close = 120 - 100 = 20 dominates high - low = 2
        prices.push((120.0, 118.0, 119.0));

        let bars = create_test_bars(&prices);
        let atr = atr(&bars, 14).unwrap();
        // 13 ranges of 2.0 plus one of 20.0
        let expected = (13.0 * 2.0 + 20.0) / 14.0;
        assert!((atr - expected).abs() < 1e-9);
    }

    #[test]
    fn test_atr_insufficient_data() {
        let bars = create_test_bars(&vec![(101.0, 99.0, 100.0); 14]);
        let err = atr(&bars, 14).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData { needed: 15, have: 14 }
        ));
    }

    #[test]
    fn test_atr_is_deterministic() {
        let bars = create_test_bars(&[
            (105.0, 95.0, 102.0),
            (110.0, 98.0, 105.0),
            (108.0, 92.0, 95.0),
            (103.0, 88.0, 100.0),
            (115.0, 97.0, 110.0),
        ]);
        let a = atr(&bars, 4).unwrap();
        let b = atr(&bars, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_average_atr_flat_equals_atr() {
        let bars = create_test_bars(&vec![(101.0, 99.0, 100.0); 30]);
        let avg = average_atr(&bars, 14, 10).unwrap();
        assert!((avg - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_atr_below_current_after_spike() {
        let mut prices = vec![(101.0, 99.0, 100.0); 25];
        // Recent volatility explosion
        for _ in 0..5 {
            prices.push((110.0, 90.0, 105.0));
        }

        let bars = create_test_bars(&prices);
        let current = atr(&bars, 14).unwrap();
        let avg = average_atr(&bars, 14, 10).unwrap();
        assert!(current > avg);
    }

    #[test]
    fn test_average_atr_insufficient_data() {
        let bars = create_test_bars(&vec![(101.0, 99.0, 100.0); 20]);
        assert!(average_atr(&bars, 14, 10).is_err());
    }
}
