use thiserror::Error;

/// Failure reported by a host sink.
///
/// Sink errors are absorbed by the emitter adapter: the offending event is
/// counted as dropped and the pump keeps running.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The host tore the sink down.
    #[error("sink closed")]
    Closed,

    /// Anything else the host wants to report.
    #[error("{0}")]
    Other(String),
}

impl SinkError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Host-provided endpoint receiving named event payloads.
///
/// The core holds a non-owning reference whose lifetime the host guarantees
/// to outlive the controller. `emit` is called from the pump thread and must
/// be thread-safe and non-blocking (or bounded-latency); a slow sink simply
/// rate-limits the pump.
pub trait EventSink: Send + Sync {
    /// Deliver `(name, payload)` to the host.
    fn emit(&self, name: &str, payload: &str) -> Result<(), SinkError>;
}
