use crate::error::EngineError;
use crate::models::OrderRequest;

/// Broker order channel. The wire connection itself (handshake, auth,
/// reconnection) lives outside this crate; the controller only needs to
/// push frames through it.
pub trait ExecutionSink: Send {
    /// Submit an order. Called at most once per trade; the acknowledgment
    /// comes back asynchronously as an `OrderAck` event.
    fn submit(&mut self, order: &OrderRequest) -> Result<(), EngineError>;

    /// Ask the broker to start streaming balance updates. Triggered by the
    /// authorization acknowledgment.
    fn request_balance(&mut self) -> Result<(), EngineError>;
}

/// Dry-run sink: renders the frames it would send and logs them.
pub struct LoggingSink;

impl ExecutionSink for LoggingSink {
    fn submit(&mut self, order: &OrderRequest) -> Result<(), EngineError> {
        let frame = serde_json::to_string(order)
            .map_err(|e| EngineError::Sink(e.to_string()))?;
        tracing::info!(%frame, "dry-run: order frame");
        Ok(())
    }

    fn request_balance(&mut self) -> Result<(), EngineError> {
        tracing::info!("dry-run: balance subscription request");
        Ok(())
    }
}
