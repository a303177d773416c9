//! # playback-capture-replay
//!
//! Hardware-free backend for playback-capture-core.
//!
//! Provides:
//! - `Clip` — in-memory mono 16-bit PCM, generated or loaded from WAV
//! - `ReplaySession` — `CaptureSession` that serves a clip in real time
//! - `ReplayBackend` — `CaptureBackend` factory over a clip
//!
//! Useful wherever the OS playback-capture primitive is unavailable or
//! unwanted: host integration tests, CI, demos.
//!
//! ## Usage
//! ```ignore
//! use playback_capture_core::CaptureController;
//! use playback_capture_replay::{Clip, ReplayBackend};
//!
//! let backend = ReplayBackend::new(Clip::sine(440.0, 2_000, 16_000));
//! let controller = CaptureController::new(Arc::new(backend), sink);
//! controller.start_capture()?;
//! ```

pub mod clip;
pub mod replay;

pub use clip::Clip;
pub use replay::{ReplayBackend, ReplaySession};
