use thiserror::Error;

/// Errors that can occur during playback capture operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("playback capture is not supported on this platform")]
    Unsupported,

    #[error("playback capture was denied by the operating system")]
    Denied,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("busy: {0}")]
    Busy(String),

    #[error("read failed: {0}")]
    Io(String),

    #[error("capture session closed")]
    Closed,
}

impl CaptureError {
    /// Stable kind string carried as the `onAudioError` payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unsupported => "Unsupported",
            Self::Denied => "Denied",
            Self::InvalidState(_) => "InvalidState",
            Self::Busy(_) => "Busy",
            Self::Io(_) => "IOError",
            Self::Closed => "Closed",
        }
    }
}
