use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::traits::capture_session::CaptureSession;

/// Factory for OS playback-capture sessions.
///
/// The platform half of the system implements this: it owns the OS
/// capture primitive and opens one configured handle per session.
/// Implemented by `ReplayBackend` (hardware-free) and by host-side
/// platform bridges.
pub trait CaptureBackend: Send + Sync {
    /// Whether this platform offers a playback-capture primitive.
    ///
    /// Host shells gate `start_capture` on this; the controller itself
    /// never probes.
    fn is_available(&self) -> bool;

    /// Open a capture handle configured for `config`'s format and usage
    /// filter. The handle is returned in the open state; the controller
    /// calls `start` on it.
    fn open(&self, config: &CaptureConfig) -> Result<Box<dyn CaptureSession>, CaptureError>;
}
