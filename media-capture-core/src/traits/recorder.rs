use std::sync::Arc;
use std::time::Duration;

use crate::events::{Listener, Subscription};
use crate::models::error::CaptureError;
use crate::traits::media_devices::MediaStream;

/// Options passed to the platform when creating a recorder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderOptions {
    pub mime_type: Option<String>,
}

/// Notifications emitted by a platform recorder.
///
/// `Started`, `Paused`, `Resumed` and `Stopped` acknowledge requests and may
/// arrive out of call order. A final `DataAvailable` usually precedes
/// `Stopped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    Started,
    DataAvailable(Vec<u8>),
    Paused,
    Resumed,
    Stopped,
    Error(String),
}

/// A segment-based recorder wrapping a live stream.
///
/// All control methods are fire-and-forget requests; completion is
/// reported through [`MediaRecorder::on_event`].
pub trait MediaRecorder: Send + Sync {
    /// Begin recording. `segment_hint` controls how often data is emitted.
    fn start(&self, segment_hint: Option<Duration>);

    fn pause(&self);

    fn resume(&self);

    fn stop(&self);

    /// MIME type of the produced data.
    fn mime_type(&self) -> String;

    fn on_event(&self, listener: Listener<RecorderEvent>) -> Subscription;
}

/// Creates recorders for live streams.
pub trait RecorderFactory: Send + Sync {
    fn create_recorder(
        &self,
        stream: Arc<dyn MediaStream>,
        options: RecorderOptions,
    ) -> Result<Box<dyn MediaRecorder>, CaptureError>;
}
