//! Scripted doubles for exercising the pump and controller without an OS
//! capture primitive.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::state::SessionState;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::capture_session::CaptureSession;
use crate::traits::event_sink::{EventSink, SinkError};

/// One scripted `read` outcome.
#[derive(Clone, Debug)]
pub(crate) enum ReadStep {
    Chunk(Vec<u8>),
    Underrun,
    Fail(CaptureError),
    Close,
}

/// Counters shared between a backend and the sessions it opens.
#[derive(Clone, Default, Debug)]
pub(crate) struct SharedCounters {
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl SharedCounters {
    pub(crate) fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously open sessions ever observed.
    pub(crate) fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn note_open(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
    }

    fn note_release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_sub(1, Ordering::SeqCst);
    }

    fn note_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

/// Script for one session opened by a [`ScriptedBackend`].
#[derive(Clone, Default)]
pub(crate) struct SessionScript {
    pub steps: Vec<ReadStep>,
    /// Chunk served forever once `steps` drain; `None` means endless
    /// underrun instead.
    pub repeat: Option<Vec<u8>>,
    pub fail_start: Option<CaptureError>,
}

/// Capture session driven by a [`SessionScript`].
#[derive(Debug)]
pub(crate) struct ScriptedSession {
    steps: VecDeque<ReadStep>,
    repeat: Option<Vec<u8>>,
    state: SessionState,
    fail_start: Option<CaptureError>,
    counters: SharedCounters,
}

impl ScriptedSession {
    pub(crate) fn new(steps: Vec<ReadStep>, counters: &SharedCounters) -> Self {
        counters.note_open();
        Self {
            steps: steps.into(),
            repeat: None,
            state: SessionState::Open,
            fail_start: None,
            counters: counters.clone(),
        }
    }

    fn from_script(script: SessionScript, counters: &SharedCounters) -> Self {
        let mut session = Self::new(script.steps, counters);
        session.repeat = script.repeat;
        session.fail_start = script.fail_start;
        session
    }
}

impl CaptureSession for ScriptedSession {
    fn state(&self) -> SessionState {
        self.state
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        if self.state != SessionState::Open {
            return Err(CaptureError::InvalidState(format!(
                "cannot start a {} session",
                self.state.describe()
            )));
        }
        if let Some(err) = self.fail_start.take() {
            return Err(err);
        }
        self.state = SessionState::Recording;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        if self.state.is_released() {
            return Err(CaptureError::InvalidState("session released".into()));
        }
        self.counters.note_read();
        match self.steps.pop_front() {
            Some(ReadStep::Chunk(bytes)) => {
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
            Some(ReadStep::Underrun) => Ok(0),
            Some(ReadStep::Fail(err)) => Err(err),
            Some(ReadStep::Close) => Err(CaptureError::Closed),
            None => {
                // Script drained: emulate a blocking device with a bounded
                // wait, then either repeat or underrun.
                std::thread::sleep(Duration::from_millis(1));
                match &self.repeat {
                    Some(bytes) => {
                        buf[..bytes.len()].copy_from_slice(bytes);
                        Ok(bytes.len())
                    }
                    None => Ok(0),
                }
            }
        }
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        if self.state != SessionState::Recording {
            return Err(CaptureError::InvalidState(format!(
                "cannot stop a {} session",
                self.state.describe()
            )));
        }
        self.state = SessionState::Stopped;
        Ok(())
    }

    fn release(&mut self) {
        if !self.state.is_released() {
            self.state = SessionState::Released;
            self.counters.note_release();
        }
    }
}

/// Backend handing out [`ScriptedSession`]s.
///
/// Each `open` consumes the next queued script; once the queue is empty,
/// sessions default to endless underrun so any number of start/stop cycles
/// can run against one backend.
pub(crate) struct ScriptedBackend {
    scripts: Mutex<VecDeque<SessionScript>>,
    fail_open: Mutex<Option<CaptureError>>,
    counters: SharedCounters,
    available: bool,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            fail_open: Mutex::new(None),
            counters: SharedCounters::default(),
            available: true,
        }
    }

    pub(crate) fn queue_script(&self, script: SessionScript) {
        self.scripts.lock().push_back(script);
    }

    pub(crate) fn fail_next_open(&self, err: CaptureError) {
        *self.fail_open.lock() = Some(err);
    }

    pub(crate) fn counters(&self) -> SharedCounters {
        self.counters.clone()
    }
}

impl CaptureBackend for ScriptedBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    fn open(&self, _config: &CaptureConfig) -> Result<Box<dyn CaptureSession>, CaptureError> {
        if let Some(err) = self.fail_open.lock().take() {
            return Err(err);
        }
        let script = self.scripts.lock().pop_front().unwrap_or_default();
        Ok(Box::new(ScriptedSession::from_script(script, &self.counters)))
    }
}

/// Sink recording every `(name, payload)` it receives.
pub(crate) struct CollectingSink {
    events: Mutex<Vec<(String, String)>>,
    fail_budget: AtomicUsize,
}

impl CollectingSink {
    pub(crate) fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_budget: AtomicUsize::new(0),
        }
    }

    pub(crate) fn events(&self) -> Vec<(String, String)> {
        self.events.lock().clone()
    }

    pub(crate) fn payloads_for(&self, name: &str) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Make the next `n` emits fail.
    pub(crate) fn fail_next_emits(&self, n: usize) {
        self.fail_budget.store(n, Ordering::SeqCst);
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, name: &str, payload: &str) -> Result<(), SinkError> {
        let mut budget = self.fail_budget.load(Ordering::SeqCst);
        while budget > 0 {
            match self.fail_budget.compare_exchange(
                budget,
                budget - 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Err(SinkError::other("scripted sink failure")),
                Err(actual) => budget = actual,
            }
        }
        self.events.lock().push((name.to_string(), payload.to_string()));
        Ok(())
    }
}

/// Poll `cond` until it holds or `timeout` elapses.
pub(crate) fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
