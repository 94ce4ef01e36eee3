// Technical indicators module
// ATR and simple moving averages over the market window

pub mod atr;
pub mod moving_average;

pub use atr::{atr, average_atr};
pub use moving_average::{closes, sma};
