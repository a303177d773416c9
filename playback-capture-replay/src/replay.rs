use std::time::{Duration, Instant};

use playback_capture_core::{
    CaptureBackend, CaptureConfig, CaptureError, CaptureSession, SessionState,
};

use crate::clip::Clip;

/// Bounded interval a paced read waits before reporting an underrun.
const READ_POLL: Duration = Duration::from_millis(10);

/// `CaptureBackend` that replays a clip instead of touching OS audio.
///
/// By default sessions are paced to the configured byte rate, so the pump
/// sees the timing of a real device: bounded blocking reads, underruns when
/// it polls faster than the stream. `unpaced` serves the clip as fast as
/// the pump drains it, which is what deterministic tests want.
pub struct ReplayBackend {
    clip: Clip,
    paced: bool,
    looping: bool,
    fail_open: Option<CaptureError>,
    fail_start: Option<CaptureError>,
}

impl ReplayBackend {
    pub fn new(clip: Clip) -> Self {
        Self {
            clip,
            paced: true,
            looping: false,
            fail_open: None,
            fail_start: None,
        }
    }

    /// Serve reads as fast as the caller drains them.
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    /// Restart the clip instead of closing at its end.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Make every `open` fail with `err`, for rollback testing.
    pub fn failing_open(mut self, err: CaptureError) -> Self {
        self.fail_open = Some(err);
        self
    }

    /// Make every session's `start` fail with `err`.
    pub fn failing_start(mut self, err: CaptureError) -> Self {
        self.fail_start = Some(err);
        self
    }
}

impl CaptureBackend for ReplayBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn open(&self, config: &CaptureConfig) -> Result<Box<dyn CaptureSession>, CaptureError> {
        if let Some(err) = &self.fail_open {
            return Err(err.clone());
        }
        if config.sample_rate != self.clip.sample_rate() {
            log::warn!(
                "clip is {} Hz but capture config wants {} Hz",
                self.clip.sample_rate(),
                config.sample_rate
            );
            return Err(CaptureError::Unsupported);
        }
        Ok(Box::new(ReplaySession {
            data: self.clip.to_le_bytes(),
            cursor: 0,
            served: 0,
            bytes_per_second: config.bytes_per_second(),
            paced: self.paced,
            looping: self.looping,
            state: SessionState::Open,
            started_at: None,
            fail_start: self.fail_start.clone(),
        }))
    }
}

/// `CaptureSession` serving one clip's byte stream.
#[derive(Debug)]
pub struct ReplaySession {
    data: Vec<u8>,
    cursor: usize,
    served: u64,
    bytes_per_second: usize,
    paced: bool,
    looping: bool,
    state: SessionState,
    started_at: Option<Instant>,
    fail_start: Option<CaptureError>,
}

impl ReplaySession {
    /// Bytes the wall clock has unlocked but the caller has not read yet.
    fn pacing_budget(&self) -> usize {
        let Some(started) = self.started_at else {
            return 0;
        };
        let allowed = (started.elapsed().as_secs_f64() * self.bytes_per_second as f64) as u64;
        allowed.saturating_sub(self.served) as usize
    }
}

impl CaptureSession for ReplaySession {
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
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        if !self.state.is_recording() {
            return Err(CaptureError::InvalidState(format!(
                "cannot read from a {} session",
                self.state.describe()
            )));
        }
        if buf.is_empty() {
            return Ok(0);
        }

        if self.cursor >= self.data.len() {
            if self.looping && !self.data.is_empty() {
                self.cursor = 0;
            } else {
                return Err(CaptureError::Closed);
            }
        }

        let mut budget = usize::MAX;
        if self.paced {
            budget = self.pacing_budget();
            if budget < 2 {
                std::thread::sleep(READ_POLL);
                budget = self.pacing_budget();
                if budget < 2 {
                    return Ok(0);
                }
            }
        }

        let remaining = self.data.len() - self.cursor;
        // Whole frames only.
        let n = buf.len().min(remaining).min(budget) & !1;
        if n == 0 {
            return Ok(0);
        }
        buf[..n].copy_from_slice(&self.data[self.cursor..self.cursor + n]);
        self.cursor += n;
        self.served += n as u64;
        Ok(n)
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
        self.state = SessionState::Released;
        self.data = Vec::new();
    }
}
