use crate::error::EngineError;
use crate::models::PriceBar;

/// Simple Moving Average over the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Result<f64, EngineError> {
    if values.len() < period || period == 0 {
        return Err(EngineError::InsufficientData {
            needed: period,
            have: values.len(),
        });
    }

    let sum: f64 = values.iter().rev().take(period).sum();
    Ok(sum / period as f64)
}

/// Closing prices of the given bars, oldest first.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
