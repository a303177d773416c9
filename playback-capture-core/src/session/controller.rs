use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::CaptureError;
use crate::models::state::ControllerState;
use crate::session::emitter::EventEmitter;
use crate::session::pump::{FramePump, PumpExit};
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::event_sink::EventSink;

/// Running pump: its cooperative stop flag plus the handle to join it.
struct PumpHandle {
    stop: Arc<AtomicBool>,
    thread: thread::JoinHandle<PumpExit>,
}

/// Publicly exposed capture surface: `start_capture` and `stop_capture`.
///
/// Owns the pump thread and, through it, the capture session. At most one
/// session is open at any time. Entry points execute on the host's caller
/// thread, which must not be the pump thread.
///
/// Concurrent callers are serialized on a transition gate: whoever arrives
/// during an in-flight start or stop waits for it to complete and then acts
/// on the settled state. Under that policy a re-entrant `start_capture`
/// observes the running session and fails with `InvalidState`, and every
/// `stop_capture` caller returns success with the state machine back at
/// idle.
pub struct CaptureController {
    backend: Arc<dyn CaptureBackend>,
    emitter: EventEmitter,
    config: CaptureConfig,
    /// Transition gate; held across a whole start or stop.
    gate: Mutex<()>,
    state: Arc<Mutex<ControllerState>>,
    pump: Mutex<Option<PumpHandle>>,
    diagnostics: Arc<Mutex<CaptureDiagnostics>>,
}

impl CaptureController {
    pub fn new(backend: Arc<dyn CaptureBackend>, sink: Arc<dyn EventSink>) -> Self {
        Self::with_config(backend, sink, CaptureConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn CaptureBackend>,
        sink: Arc<dyn EventSink>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            backend,
            emitter: EventEmitter::new(sink),
            config,
            gate: Mutex::new(()),
            state: Arc::new(Mutex::new(ControllerState::Idle)),
            pump: Mutex::new(None),
            diagnostics: Arc::new(Mutex::new(CaptureDiagnostics::default())),
        }
    }

    /// Current controller state.
    pub fn state(&self) -> ControllerState {
        *self.state.lock()
    }

    /// Snapshot of the current (or most recent) session's counters.
    pub fn diagnostics(&self) -> CaptureDiagnostics {
        self.diagnostics.lock().clone()
    }

    /// Whether the backend offers a playback-capture primitive.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Open a capture session and spawn the pump.
    ///
    /// Valid only from idle; fails with `InvalidState` otherwise. Any
    /// failure while acquiring the session releases whatever was partially
    /// acquired and leaves the state machine at idle.
    pub fn start_capture(&self) -> Result<(), CaptureError> {
        let _gate = self.gate.lock();
        {
            let mut state = self.state.lock();
            if !state.is_idle() {
                return Err(CaptureError::InvalidState(format!(
                    "can only start from idle state (currently {})",
                    state.describe()
                )));
            }
            *state = ControllerState::Starting;
        }
        // A handle may be left over from a pump that died on a read error;
        // the thread is done or exiting, so join it before starting anew.
        self.reap_pump();

        match self.acquire_and_spawn() {
            Ok(handle) => {
                *self.pump.lock() = Some(handle);
                *self.state.lock() = ControllerState::Running;
                log::debug!("capture running");
                Ok(())
            }
            Err(err) => {
                *self.state.lock() = ControllerState::Idle;
                log::debug!("capture start failed: {}", err);
                Err(err)
            }
        }
    }

    /// Stop the pump, then stop and release the session.
    ///
    /// No-op at idle; idempotent across sequential and concurrent callers.
    /// Waits for the pump to join, so no chunk event is emitted after this
    /// returns.
    pub fn stop_capture(&self) -> Result<(), CaptureError> {
        let _gate = self.gate.lock();
        let handle = {
            let mut state = self.state.lock();
            match *state {
                ControllerState::Idle => {
                    drop(state);
                    self.reap_pump();
                    return Ok(());
                }
                ControllerState::Running => {
                    *state = ControllerState::Stopping;
                    self.pump.lock().take()
                }
                // Unreachable while the gate serializes transitions.
                other => {
                    return Err(CaptureError::Busy(format!(
                        "state transition in flight ({})",
                        other.describe()
                    )));
                }
            }
        };

        if let Some(PumpHandle { stop, thread }) = handle {
            stop.store(true, Ordering::SeqCst);
            match thread.join() {
                Ok(PumpExit::Stopped(mut session)) => {
                    if let Err(err) = session.stop() {
                        log::warn!("session stop: {}", err);
                    }
                    session.release();
                }
                // The pump already emitted onAudioError and released the
                // session on its way out.
                Ok(PumpExit::Failed(_)) => {}
                Err(_) => log::error!("pump thread panicked"),
            }
        }

        *self.state.lock() = ControllerState::Idle;
        log::debug!("capture stopped");
        Ok(())
    }

    fn acquire_and_spawn(&self) -> Result<PumpHandle, CaptureError> {
        self.config.validate().map_err(CaptureError::InvalidState)?;

        let mut session = self.backend.open(&self.config)?;
        if let Err(err) = session.start() {
            session.release();
            return Err(err);
        }

        *self.diagnostics.lock() = CaptureDiagnostics::new_session();
        log::debug!(
            "capture session {} opened at {} Hz",
            self.diagnostics.lock().session_id,
            self.config.sample_rate
        );

        let stop = Arc::new(AtomicBool::new(false));
        let pump = FramePump::new(
            session,
            Arc::clone(&stop),
            self.emitter.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.diagnostics),
            self.config.buffer_capacity,
        );
        let thread = thread::Builder::new()
            .name("playback-capture-pump".into())
            .spawn(move || pump.run())
            .map_err(|err| CaptureError::Io(format!("failed to spawn pump thread: {}", err)))?;

        Ok(PumpHandle { stop, thread })
    }

    /// Join a pump left behind by a failed session so no thread leaks.
    ///
    /// Only called while no session is running, where any remaining handle
    /// belongs to a pump that has exited (or is about to).
    fn reap_pump(&self) {
        let handle = self.pump.lock().take();
        if let Some(handle) = handle {
            match handle.thread.join() {
                Ok(PumpExit::Failed(err)) => {
                    log::debug!("reaped failed pump: {}", err)
                }
                Ok(PumpExit::Stopped(mut session)) => {
                    // Cleanly stopped pumps are normally joined by
                    // stop_capture itself.
                    let _ = session.stop();
                    session.release();
                }
                Err(_) => log::error!("pump thread panicked"),
            }
        }
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        // An abandoned controller still joins its pump and releases the
        // session.
        if let Some(PumpHandle { stop, thread }) = self.pump.get_mut().take() {
            stop.store(true, Ordering::SeqCst);
            if let Ok(PumpExit::Stopped(mut session)) = thread.join() {
                let _ = session.stop();
                session.release();
            }
        }
    }
}
