use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::event_sink::EventSink;

/// Event carrying one base64-encoded PCM chunk.
pub const AUDIO_DATA_EVENT: &str = "onAudioData";

/// Terminal event carrying the error kind that killed the pump.
pub const AUDIO_ERROR_EVENT: &str = "onAudioError";

/// Serializing adapter around the host event sink.
///
/// Emissions within one controller session reach the sink in call order.
/// Delivery is fire-and-forget: a sink failure is absorbed, logged, and
/// counted; the frame is considered emitted-and-lost and the pump keeps
/// running.
#[derive(Clone)]
pub struct EventEmitter {
    sink: Arc<dyn EventSink>,
    order: Arc<Mutex<()>>,
    dropped: Arc<AtomicU64>,
}

impl EventEmitter {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            order: Arc::new(Mutex::new(())),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Deliver `(name, payload)` to the host.
    pub fn emit(&self, name: &str, payload: &str) {
        let _order = self.order.lock();
        if let Err(err) = self.sink.emit(name, payload) {
            self.dropped.fetch_add(1, Ordering::SeqCst);
            log::warn!("event sink rejected {}: {}", name, err);
        }
    }

    /// Events the sink rejected since this emitter was created.
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }
}
