use serde::{Deserialize, Serialize};

/// Counters describing one capture session.
///
/// Updated by the pump while running; a snapshot is available through
/// `CaptureController::diagnostics` and survives after the session stops.
/// Serializable for JSON export to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDiagnostics {
    /// Identifier of the session these counters belong to.
    pub session_id: String,

    /// RFC 3339 timestamp of when the session started.
    pub started_at: String,

    /// Chunk events handed to the sink so far.
    pub frames_emitted: u64,

    /// Total decoded bytes captured so far.
    pub bytes_captured: u64,

    /// Reads that returned no data.
    pub underruns: u64,

    /// Events the host sink rejected (absorbed by the emitter).
    pub dropped_events: u64,

    /// Error kind that terminated the pump, if it died on a read failure.
    pub terminal_error: Option<String>,
}

impl CaptureDiagnostics {
    /// Fresh counters for a session starting now.
    pub fn new_session() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            ..Self::default()
        }
    }
}
