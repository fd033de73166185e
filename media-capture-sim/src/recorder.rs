//! Simulated segment recorder.
//!
//! Chunks are produced on demand with [`SimRecorder::push_chunk`].
//! Acknowledgments are emitted immediately by default; in deferred mode they
//! queue up until released, optionally in reverse order, to exercise
//! out-of-order delivery.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use media_capture_core::events::{EventRegistry, Listener, Subscription};
use media_capture_core::models::device::MediaKind;
use media_capture_core::models::error::CaptureError;
use media_capture_core::traits::media_devices::MediaStream;
use media_capture_core::traits::recorder::{
    MediaRecorder, RecorderEvent, RecorderFactory, RecorderOptions,
};

#[derive(Debug, Default)]
struct RecorderState {
    calls: Vec<&'static str>,
    segment_hint: Option<Duration>,
    deferred: bool,
    pending: Vec<RecorderEvent>,
}

struct Shared {
    stream_id: String,
    mime_type: String,
    state: Mutex<RecorderState>,
    events: EventRegistry<RecorderEvent>,
}

/// Handle to a simulated recorder. Clones share the same recorder.
#[derive(Clone)]
pub struct SimRecorder {
    shared: Arc<Shared>,
}

impl SimRecorder {
    fn new(stream_id: &str, mime_type: String, deferred: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                stream_id: stream_id.to_string(),
                mime_type,
                state: Mutex::new(RecorderState {
                    deferred,
                    ..RecorderState::default()
                }),
                events: EventRegistry::new(),
            }),
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.shared.stream_id
    }

    /// Control calls received so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.shared.state.lock().calls.clone()
    }

    pub fn segment_hint(&self) -> Option<Duration> {
        self.shared.state.lock().segment_hint
    }

    /// Emit a data chunk.
    pub fn push_chunk(&self, data: &[u8]) {
        self.shared
            .events
            .emit(RecorderEvent::DataAvailable(data.to_vec()));
    }

    /// Emit a recorder failure.
    pub fn fail(&self, message: &str) {
        self.shared
            .events
            .emit(RecorderEvent::Error(message.to_string()));
    }

    /// Acknowledgments held back in deferred mode.
    pub fn pending_acks(&self) -> Vec<RecorderEvent> {
        self.shared.state.lock().pending.clone()
    }

    /// Emit held-back acknowledgments in call order.
    pub fn release_acks(&self) {
        let pending = std::mem::take(&mut self.shared.state.lock().pending);
        for event in pending {
            self.shared.events.emit(event);
        }
    }

    /// Emit held-back acknowledgments newest first.
    pub fn release_acks_reversed(&self) {
        let pending = std::mem::take(&mut self.shared.state.lock().pending);
        for event in pending.into_iter().rev() {
            self.shared.events.emit(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.shared.events.len()
    }

    fn control(&self, call: &'static str, ack: RecorderEvent) {
        let emit_now = {
            let mut state = self.shared.state.lock();
            state.calls.push(call);
            if state.deferred {
                state.pending.push(ack.clone());
                false
            } else {
                true
            }
        };
        log::debug!("sim: recorder on {} got {}", self.shared.stream_id, call);
        if emit_now {
            self.shared.events.emit(ack);
        }
    }
}

impl MediaRecorder for SimRecorder {
    fn start(&self, segment_hint: Option<Duration>) {
        self.shared.state.lock().segment_hint = segment_hint;
        self.control("start", RecorderEvent::Started);
    }

    fn pause(&self) {
        self.control("pause", RecorderEvent::Paused);
    }

    fn resume(&self) {
        self.control("resume", RecorderEvent::Resumed);
    }

    fn stop(&self) {
        self.control("stop", RecorderEvent::Stopped);
    }

    fn mime_type(&self) -> String {
        self.shared.mime_type.clone()
    }

    fn on_event(&self, listener: Listener<RecorderEvent>) -> Subscription {
        self.shared.events.subscribe(listener)
    }
}

#[derive(Default)]
struct FactoryState {
    created: Vec<SimRecorder>,
    deferred: bool,
    failure: Option<String>,
}

/// Creates [`SimRecorder`]s and remembers them for inspection.
#[derive(Default)]
pub struct SimRecorderFactory {
    state: Mutex<FactoryState>,
}

impl SimRecorderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorders created from now on hold their acknowledgments.
    pub fn set_deferred_acks(&self, deferred: bool) {
        self.state.lock().deferred = deferred;
    }

    /// Make `create_recorder` fail with `message`, or succeed again with `None`.
    pub fn set_failure(&self, message: Option<&str>) {
        self.state.lock().failure = message.map(str::to_string);
    }

    pub fn created(&self) -> Vec<SimRecorder> {
        self.state.lock().created.clone()
    }

    pub fn last(&self) -> Option<SimRecorder> {
        self.state.lock().created.last().cloned()
    }
}

impl RecorderFactory for SimRecorderFactory {
    fn create_recorder(
        &self,
        stream: Arc<dyn MediaStream>,
        options: RecorderOptions,
    ) -> Result<Box<dyn MediaRecorder>, CaptureError> {
        let mut state = self.state.lock();
        if let Some(ref message) = state.failure {
            return Err(CaptureError::RecorderFailed(message.clone()));
        }

        let mime_type = options.mime_type.unwrap_or_else(|| {
            if stream.track(MediaKind::Video).is_some() {
                "video/webm".to_string()
            } else {
                "audio/webm".to_string()
            }
        });
        let recorder = SimRecorder::new(stream.id(), mime_type, state.deferred);
        state.created.push(recorder.clone());
        Ok(Box::new(recorder))
    }
}
