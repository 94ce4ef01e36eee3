// Trade lifecycle orchestration and collaborator seams
pub mod arena;
pub mod controller;
pub mod provider;
pub mod sink;
pub mod trade_log;

pub use arena::TradeArena;
pub use controller::{Controller, TickOutcome};
pub use provider::{BarProvider, SyntheticBarProvider};
pub use sink::{ExecutionSink, LoggingSink};
pub use trade_log::{MemoryTradeLog, TracingTradeLog, TradeLog, TradeLogEntry};
