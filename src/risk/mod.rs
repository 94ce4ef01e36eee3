// Risk management module
pub mod gates;

pub use gates::{AccountState, RiskManager, RiskVeto};
