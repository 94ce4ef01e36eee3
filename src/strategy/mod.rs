// Signal generation: breakout and trend rules over the market window
pub mod signals;

pub use signals::{Evaluation, SignalGenerator};
