//! # playback-capture-core
//!
//! Platform-agnostic playback capture core library.
//!
//! Captures the audio other applications are playing on the host device and
//! pushes it to an embedding host as ordered, base64-encoded chunk events.
//! Platform-specific backends implement the `CaptureBackend` trait and plug
//! into the generic `CaptureController`; the host registers an `EventSink`
//! to receive `onAudioData` / `onAudioError` events.
//!
//! ## Architecture
//!
//! ```text
//! playback-capture-core (this crate)
//! ├── traits/       ← CaptureBackend, CaptureSession, EventSink
//! ├── models/       ← CaptureError, ControllerState, CaptureConfig, CaptureDiagnostics
//! ├── processing/   ← base64 chunk encoding
//! └── session/      ← CaptureController, FramePump, EventEmitter
//! ```
//!
//! Data flow while running:
//!
//! ```text
//! [CaptureSession] → read → [FramePump] → encode_chunk → [EventEmitter] → host sink
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{CaptureConfig, CaptureUsage, SampleFormat, DEFAULT_SAMPLE_RATE, FRAME_BUFFER_CAPACITY};
pub use models::diagnostics::CaptureDiagnostics;
pub use models::error::CaptureError;
pub use models::state::{ControllerState, SessionState};
pub use processing::chunk_encoder::encode_chunk;
pub use session::controller::CaptureController;
pub use session::emitter::{EventEmitter, AUDIO_DATA_EVENT, AUDIO_ERROR_EVENT};
pub use traits::capture_backend::CaptureBackend;
pub use traits::capture_session::CaptureSession;
pub use traits::event_sink::{EventSink, SinkError};
