use thiserror::Error;

/// Errors raised by the decision pipeline.
///
/// `InsufficientData` and `InvalidRisk` are non-fatal: they suppress the
/// current evaluation and the event loop continues.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A window or indicator was asked for more history than it holds.
    #[error("insufficient data: need {needed} bars, have {have}")]
    InsufficientData { needed: usize, have: usize },

    /// Position sizing was given a non-positive stop distance.
    #[error("invalid risk parameters: stop distance {stop_distance} must be > 0")]
    InvalidRisk { stop_distance: f64 },

    /// The historical-bar provider could not serve the request.
    #[error("bar provider failed: {0}")]
    Provider(String),

    /// The broker order channel rejected a submission outright.
    #[error("execution sink failed: {0}")]
    Sink(String),
}

impl EngineError {
    /// True for errors that suppress a single evaluation rather than
    /// aborting the loop.
    pub fn is_suppression(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientData { .. } | EngineError::InvalidRisk { .. }
        )
    }
}
