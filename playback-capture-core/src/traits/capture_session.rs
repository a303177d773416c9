use crate::models::error::CaptureError;
use crate::models::state::SessionState;

/// A live OS playback-capture handle.
///
/// Owns the platform recording object for one session. The controller hands
/// the boxed session to the pump thread for its entire lifetime and gets it
/// back for release only after the pump has joined.
///
/// Lifecycle: `open → recording → stopped → released`. Every operation on a
/// released session fails with [`CaptureError::InvalidState`].
///
/// Implementations should release OS resources in `Drop` as a backstop; the
/// controller still calls [`release`](CaptureSession::release) explicitly on
/// every orderly path.
pub trait CaptureSession: Send + std::fmt::Debug {
    /// Current handle state.
    fn state(&self) -> SessionState;

    /// Begin delivering samples. Transitions: open → recording.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Pull up to `buf.len()` bytes of little-endian 16-bit PCM.
    ///
    /// Returns the number of bytes written into `buf`: always a multiple of
    /// the 2-byte frame size and at most `buf.len()`. Returns 0 on underrun
    /// without failing, and may block the caller for a bounded interval
    /// while waiting for samples. Fails with [`CaptureError::Closed`] once
    /// the stream can produce no more data, and [`CaptureError::Io`] on a
    /// device failure.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError>;

    /// Stop delivering samples. Transitions: recording → stopped.
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Free the OS resources. Valid from any state; afterwards every other
    /// operation fails with `InvalidState`.
    fn release(&mut self);
}
