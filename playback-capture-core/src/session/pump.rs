use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::CaptureError;
use crate::models::state::ControllerState;
use crate::processing::chunk_encoder::encode_chunk;
use crate::session::emitter::{EventEmitter, AUDIO_DATA_EVENT, AUDIO_ERROR_EVENT};
use crate::traits::capture_session::CaptureSession;

/// How the pump loop ended.
pub(crate) enum PumpExit {
    /// Cooperative stop, or the session reported `Closed`. The session is
    /// handed back for the controller to stop and release after joining.
    Stopped(Box<dyn CaptureSession>),

    /// A read failed. The pump emitted `onAudioError`, released the session
    /// itself, and reset the controller state to idle.
    Failed(CaptureError),
}

/// Single worker driving the read → encode → emit loop.
///
/// Owns the capture session for its entire lifetime. One read buffer is
/// allocated per session and reused across iterations; each frame is copied
/// out of the filled prefix exactly once, into its base64 payload.
pub(crate) struct FramePump {
    session: Box<dyn CaptureSession>,
    stop: Arc<AtomicBool>,
    emitter: EventEmitter,
    controller_state: Arc<Mutex<ControllerState>>,
    diagnostics: Arc<Mutex<CaptureDiagnostics>>,
    buffer_capacity: usize,
}

impl FramePump {
    pub(crate) fn new(
        session: Box<dyn CaptureSession>,
        stop: Arc<AtomicBool>,
        emitter: EventEmitter,
        controller_state: Arc<Mutex<ControllerState>>,
        diagnostics: Arc<Mutex<CaptureDiagnostics>>,
        buffer_capacity: usize,
    ) -> Self {
        Self {
            session,
            stop,
            emitter,
            controller_state,
            diagnostics,
            buffer_capacity,
        }
    }

    /// Pump frames until stopped. Runs on the dedicated pump thread.
    pub(crate) fn run(mut self) -> PumpExit {
        let mut buffer = vec![0u8; self.buffer_capacity];
        let mut ordinal: u64 = 0;

        loop {
            // Once the flag is observed no further reads are issued. The
            // check sits before the read, so the final successful read of a
            // session is always emitted before exit.
            if self.stop.load(Ordering::SeqCst) {
                return PumpExit::Stopped(self.session);
            }

            let n = match self.session.read(&mut buffer) {
                Ok(n) => n,
                Err(CaptureError::Closed) => {
                    log::debug!("capture session closed, pump exiting");
                    return PumpExit::Stopped(self.session);
                }
                Err(err) => return self.fail(err),
            };

            if n == 0 {
                self.diagnostics.lock().underruns += 1;
                continue;
            }

            let payload = encode_chunk(&buffer[..n]);
            self.emitter.emit(AUDIO_DATA_EVENT, &payload);
            ordinal += 1;
            log::trace!("frame {}: {} bytes", ordinal, n);

            let mut diag = self.diagnostics.lock();
            diag.frames_emitted = ordinal;
            diag.bytes_captured += n as u64;
            diag.dropped_events = self.emitter.dropped_events();
        }
    }

    /// Terminal path for a failed read: one `onAudioError`, then silence.
    fn fail(mut self, err: CaptureError) -> PumpExit {
        log::error!("capture read failed: {}", err);
        self.emitter.emit(AUDIO_ERROR_EVENT, err.kind());

        if let Err(stop_err) = self.session.stop() {
            log::warn!("session stop after read failure: {}", stop_err);
        }
        self.session.release();

        {
            let mut diag = self.diagnostics.lock();
            diag.terminal_error = Some(err.kind().to_string());
            diag.dropped_events = self.emitter.dropped_events();
        }

        // Last store before exit: once idle is visible the controller may
        // reap this thread's handle.
        *self.controller_state.lock() = ControllerState::Idle;
        PumpExit::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::state::SessionState;
    use crate::session::test_support::{CollectingSink, ReadStep, ScriptedSession, SharedCounters};

    fn pump_for(
        session: Box<dyn CaptureSession>,
        stop: Arc<AtomicBool>,
        sink: Arc<CollectingSink>,
    ) -> (FramePump, Arc<Mutex<ControllerState>>, Arc<Mutex<CaptureDiagnostics>>) {
        let state = Arc::new(Mutex::new(ControllerState::Running));
        let diagnostics = Arc::new(Mutex::new(CaptureDiagnostics::new_session()));
        let pump = FramePump::new(
            session,
            stop,
            EventEmitter::new(sink),
            Arc::clone(&state),
            Arc::clone(&diagnostics),
            4096,
        );
        (pump, state, diagnostics)
    }

    #[test]
    fn emits_each_positive_read_in_order() {
        let counters = SharedCounters::default();
        let session = ScriptedSession::new(
            vec![
                ReadStep::Chunk(vec![0x01, 0x02, 0x03, 0x04]),
                ReadStep::Chunk(vec![0x05, 0x06]),
                ReadStep::Close,
            ],
            &counters,
        );
        let sink = Arc::new(CollectingSink::new());
        let (pump, _, diagnostics) = pump_for(Box::new(session), Arc::new(AtomicBool::new(false)), sink.clone());

        let exit = pump.run();
        assert!(matches!(exit, PumpExit::Stopped(_)));

        let payloads: Vec<String> = sink.events().into_iter().map(|(_, p)| p).collect();
        assert_eq!(payloads, vec!["AQIDBA==".to_string(), "BQY=".to_string()]);

        let diag = diagnostics.lock();
        assert_eq!(diag.frames_emitted, 2);
        assert_eq!(diag.bytes_captured, 6);
    }

    #[test]
    fn empty_reads_are_skipped_and_counted() {
        let counters = SharedCounters::default();
        let session = ScriptedSession::new(
            vec![
                ReadStep::Underrun,
                ReadStep::Chunk(vec![0xFF, 0xFE]),
                ReadStep::Underrun,
                ReadStep::Close,
            ],
            &counters,
        );
        let sink = Arc::new(CollectingSink::new());
        let (pump, _, diagnostics) = pump_for(Box::new(session), Arc::new(AtomicBool::new(false)), sink.clone());

        pump.run();

        let payloads: Vec<String> = sink.events().into_iter().map(|(_, p)| p).collect();
        assert_eq!(payloads, vec!["//4=".to_string()]);
        assert_eq!(diagnostics.lock().underruns, 2);
    }

    #[test]
    fn pre_set_stop_flag_means_no_reads_at_all() {
        let counters = SharedCounters::default();
        let session = ScriptedSession::new(vec![ReadStep::Chunk(vec![1, 2])], &counters);
        let sink = Arc::new(CollectingSink::new());
        let (pump, _, _) = pump_for(Box::new(session), Arc::new(AtomicBool::new(true)), sink.clone());

        let exit = pump.run();
        assert!(matches!(exit, PumpExit::Stopped(_)));
        assert!(sink.events().is_empty());
        assert_eq!(counters.reads(), 0);
    }

    #[test]
    fn final_read_before_stop_is_flushed() {
        // A session that raises the stop flag from inside `read`, as if the
        // controller stopped while the pump was blocked in the OS call.
        #[derive(Debug)]
        struct StopDuringRead {
            stop: Arc<AtomicBool>,
        }
        impl CaptureSession for StopDuringRead {
            fn state(&self) -> SessionState {
                SessionState::Recording
            }
            fn start(&mut self) -> Result<(), CaptureError> {
                Ok(())
            }
            fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
                self.stop.store(true, Ordering::SeqCst);
                buf[..2].copy_from_slice(&[0x05, 0x06]);
                Ok(2)
            }
            fn stop(&mut self) -> Result<(), CaptureError> {
                Ok(())
            }
            fn release(&mut self) {}
        }

        let stop = Arc::new(AtomicBool::new(false));
        let session = StopDuringRead {
            stop: Arc::clone(&stop),
        };
        let sink = Arc::new(CollectingSink::new());
        let (pump, _, _) = pump_for(Box::new(session), stop, sink.clone());

        let exit = pump.run();
        assert!(matches!(exit, PumpExit::Stopped(_)));

        // The read that raced the stop flag still produced its chunk, and no
        // further read was issued.
        let payloads: Vec<String> = sink.events().into_iter().map(|(_, p)| p).collect();
        assert_eq!(payloads, vec!["BQY=".to_string()]);
    }

    #[test]
    fn read_failure_emits_terminal_error_and_resets_state() {
        let counters = SharedCounters::default();
        let session = ScriptedSession::new(
            vec![
                ReadStep::Chunk(vec![0x01, 0x02]),
                ReadStep::Fail(CaptureError::Io("device vanished".into())),
            ],
            &counters,
        );
        let sink = Arc::new(CollectingSink::new());
        let (pump, state, diagnostics) = pump_for(Box::new(session), Arc::new(AtomicBool::new(false)), sink.clone());

        let exit = pump.run();
        assert!(matches!(exit, PumpExit::Failed(CaptureError::Io(_))));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, AUDIO_DATA_EVENT);
        assert_eq!(events[1], (AUDIO_ERROR_EVENT.to_string(), "IOError".to_string()));

        assert_eq!(*state.lock(), ControllerState::Idle);
        assert_eq!(diagnostics.lock().terminal_error.as_deref(), Some("IOError"));
        assert_eq!(counters.released(), 1);
    }
}
