// Core modules
pub mod config;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod market;
pub mod models;
pub mod risk;
pub mod session;
pub mod strategy;

// Re-export commonly used types
pub use config::BotConfig;
pub use error::EngineError;
pub use models::*;

pub type Result<T> = std::result::Result<T, EngineError>;
