//! Simulated streams and tracks.
//!
//! Tracks count how often they are stopped so tests can check that every
//! stream the session acquires is released exactly once.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use media_capture_core::events::{EventRegistry, Listener, Subscription};
use media_capture_core::models::device::{FrameSize, MediaKind};
use media_capture_core::models::error::CaptureError;
use media_capture_core::traits::media_devices::{MediaStream, MediaTrack};

/// A simulated capture track.
pub struct SimTrack {
    id: String,
    kind: MediaKind,
    device_id: String,
    natural_size: FrameSize,
    delivers_frames: bool,
    delivered: AtomicBool,
    ended: AtomicBool,
    stops: AtomicUsize,
    on_ended: EventRegistry<()>,
}

impl SimTrack {
    pub(crate) fn new(
        id: String,
        kind: MediaKind,
        device_id: &str,
        natural_size: FrameSize,
        delivers_frames: bool,
    ) -> Self {
        Self {
            id,
            kind,
            device_id: device_id.to_string(),
            natural_size,
            delivers_frames,
            delivered: AtomicBool::new(false),
            ended: AtomicBool::new(false),
            stops: AtomicUsize::new(0),
            on_ended: EventRegistry::new(),
        }
    }

    /// End the track from the device side (unplug, revoked access).
    pub fn end(&self) {
        if self.ended.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("sim: track {} ended", self.id);
        self.on_ended.emit(());
    }

    pub fn has_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn ended_listeners(&self) -> usize {
        self.on_ended.len()
    }
}

#[async_trait]
impl MediaTrack for SimTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn frame_size(&self) -> FrameSize {
        if self.kind == MediaKind::Video && self.delivered.load(Ordering::SeqCst) {
            self.natural_size
        } else {
            FrameSize::default()
        }
    }

    async fn first_frame(&self) -> Result<FrameSize, CaptureError> {
        if self.kind == MediaKind::Audio {
            return Ok(FrameSize::default());
        }
        if !self.delivers_frames {
            return Err(CaptureError::DeviceFault(format!(
                "{} delivered no frames",
                self.device_id
            )));
        }
        self.delivered.store(true, Ordering::SeqCst);
        Ok(self.natural_size)
    }

    fn on_ended(&self, listener: Listener<()>) -> Subscription {
        self.on_ended.subscribe(listener)
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.ended.store(true, Ordering::SeqCst);
    }
}

impl fmt::Debug for SimTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("device_id", &self.device_id)
            .field("stops", &self.stop_count())
            .finish()
    }
}

/// A simulated stream of one or two tracks.
#[derive(Debug)]
pub struct SimStream {
    id: String,
    tracks: Vec<Arc<SimTrack>>,
}

impl SimStream {
    pub(crate) fn new(id: String, tracks: Vec<Arc<SimTrack>>) -> Self {
        Self { id, tracks }
    }

    pub fn sim_tracks(&self) -> &[Arc<SimTrack>] {
        &self.tracks
    }

    pub fn sim_track(&self, kind: MediaKind) -> Option<&Arc<SimTrack>> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    pub fn uses_device(&self, device_id: &str) -> bool {
        self.tracks.iter().any(|t| t.device_id == device_id)
    }

    /// End every track from the device side.
    pub fn end(&self) {
        for track in &self.tracks {
            track.end();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.tracks.iter().all(|t| t.stop_count() > 0)
    }

    /// Every track was stopped, and none more than once.
    pub fn stopped_exactly_once(&self) -> bool {
        self.tracks.iter().all(|t| t.stop_count() == 1)
    }

    /// Highest stop count over the tracks.
    pub fn stop_count(&self) -> usize {
        self.tracks.iter().map(|t| t.stop_count()).max().unwrap_or(0)
    }
}

impl MediaStream for SimStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn MediaTrack>)
            .collect()
    }
}
