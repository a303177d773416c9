/// Controller state machine.
///
/// State transitions:
/// ```text
///          start_capture                  pump started
/// idle ──────────────────▶ starting ─────────────────▶ running
///   ▲                         │ fails                     │ stop_capture
///   │                         ▼                           ▼
///   │                       idle                       stopping
///   └──────── pump joined, session released ──────────────┘
/// ```
///
/// Transitions are triggered only by the controller entry points; a pump
/// that dies on a read error resets the state to `Idle` on its way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Starting,
    Running,
    Stopping,
}

impl ControllerState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Lowercase name used in log lines and `InvalidState` messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

/// Capture session handle state machine.
///
/// ```text
/// open ──start──▶ recording ──stop──▶ stopped
///   │                 │                  │
///   └───────────── release ─────────────┘──▶ released
/// ```
///
/// `release` is valid from any state; every other operation on a released
/// session fails with `InvalidState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Recording,
    Stopped,
    Released,
}

impl SessionState {
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
            Self::Released => "released",
        }
    }
}
