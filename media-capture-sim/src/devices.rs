//! Simulated device registry.
//!
//! Holds the device list, per-kind permission state and the streams handed
//! out so far. Tests drive it directly: plug and unplug devices, flip
//! permissions, make enumeration or specific devices fail.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use media_capture_core::events::{EventRegistry, Listener, Subscription};
use media_capture_core::models::device::{Device, FrameSize, MediaKind, PermissionState};
use media_capture_core::models::error::CaptureError;
use media_capture_core::traits::media_devices::{
    MediaDevices, MediaStream, MediaTrack, StreamConstraints,
};

use crate::stream::{SimStream, SimTrack};

/// Frame size reported by simulated cameras unless overridden.
pub const DEFAULT_FRAME_SIZE: FrameSize = FrameSize {
    width: 640,
    height: 480,
};

struct Inner {
    devices: Vec<Device>,
    enumeration_failure: Option<String>,
    permissions: HashMap<MediaKind, PermissionState>,
    defective: HashSet<String>,
    frameless: HashSet<String>,
    frame_sizes: HashMap<String, FrameSize>,
    request_delay: Option<Duration>,
    request_failure: Option<CaptureError>,
    streams: Vec<Arc<SimStream>>,
    next_stream: u64,
}

/// In-memory [`MediaDevices`] implementation.
pub struct SimulatedDevices {
    inner: Mutex<Inner>,
    device_change: EventRegistry<()>,
    video_permission: EventRegistry<PermissionState>,
    audio_permission: EventRegistry<PermissionState>,
}

impl SimulatedDevices {
    pub fn new(devices: Vec<Device>) -> Self {
        let permissions = [
            (MediaKind::Video, PermissionState::Granted),
            (MediaKind::Audio, PermissionState::Granted),
        ]
        .into_iter()
        .collect();

        Self {
            inner: Mutex::new(Inner {
                devices,
                enumeration_failure: None,
                permissions,
                defective: HashSet::new(),
                frameless: HashSet::new(),
                frame_sizes: HashMap::new(),
                request_delay: None,
                request_failure: None,
                streams: Vec::new(),
                next_stream: 0,
            }),
            device_change: EventRegistry::new(),
            video_permission: EventRegistry::new(),
            audio_permission: EventRegistry::new(),
        }
    }

    // --- Device list ---

    pub fn devices(&self) -> Vec<Device> {
        self.inner.lock().devices.clone()
    }

    /// Plug in a device and notify listeners.
    pub fn add_device(&self, device: Device) {
        log::info!("sim: device {} attached", device.id);
        self.inner.lock().devices.push(device);
        self.device_change.emit(());
    }

    /// Unplug a device: tracks reading from it end, then listeners are
    /// notified of the list change.
    pub fn remove_device(&self, device_id: &str) {
        let affected: Vec<Arc<SimStream>> = {
            let mut inner = self.inner.lock();
            inner.devices.retain(|d| d.id != device_id);
            inner
                .streams
                .iter()
                .filter(|s| s.uses_device(device_id))
                .cloned()
                .collect()
        };
        log::info!("sim: device {} detached", device_id);
        for stream in affected {
            for track in stream.sim_tracks() {
                if track.device_id() == device_id {
                    track.end();
                }
            }
        }
        self.device_change.emit(());
    }

    /// Make `enumerate_devices` fail with `message`, or succeed again with `None`.
    pub fn set_enumeration_failure(&self, message: Option<&str>) {
        self.inner.lock().enumeration_failure = message.map(str::to_string);
    }

    // --- Permissions ---

    pub fn permission(&self, kind: MediaKind) -> PermissionState {
        self.inner
            .lock()
            .permissions
            .get(&kind)
            .copied()
            .unwrap_or(PermissionState::Prompt)
    }

    /// Change the permission for `kind` and notify listeners.
    pub fn set_permission(&self, kind: MediaKind, state: PermissionState) {
        self.inner.lock().permissions.insert(kind, state);
        log::info!("sim: {} permission {:?}", kind.permission_name(), state);
        self.permission_registry(kind).emit(state);
    }

    fn permission_registry(&self, kind: MediaKind) -> &EventRegistry<PermissionState> {
        match kind {
            MediaKind::Video => &self.video_permission,
            MediaKind::Audio => &self.audio_permission,
        }
    }

    // --- Faults ---

    /// Opening this device fails with `DeviceFault`.
    pub fn mark_defective(&self, device_id: &str) {
        self.inner.lock().defective.insert(device_id.to_string());
    }

    /// This device opens but its video track never delivers a frame.
    pub fn mark_frameless(&self, device_id: &str) {
        self.inner.lock().frameless.insert(device_id.to_string());
    }

    pub fn set_frame_size(&self, device_id: &str, size: FrameSize) {
        self.inner
            .lock()
            .frame_sizes
            .insert(device_id.to_string(), size);
    }

    /// Delay every `request_stream` call, to widen race windows.
    pub fn set_request_delay(&self, delay: Option<Duration>) {
        self.inner.lock().request_delay = delay;
    }

    /// Make every `request_stream` call fail with `err`, or succeed again with `None`.
    pub fn set_request_failure(&self, err: Option<CaptureError>) {
        self.inner.lock().request_failure = err;
    }

    // --- Inspection ---

    /// Every stream handed out, oldest first.
    pub fn streams(&self) -> Vec<Arc<SimStream>> {
        self.inner.lock().streams.clone()
    }

    pub fn last_stream(&self) -> Option<Arc<SimStream>> {
        self.inner.lock().streams.last().cloned()
    }

    /// Streams not yet stopped by their holder.
    pub fn open_streams(&self) -> Vec<Arc<SimStream>> {
        self.inner
            .lock()
            .streams
            .iter()
            .filter(|s| !s.is_stopped())
            .cloned()
            .collect()
    }

    /// Device-change plus permission-change listeners currently attached.
    pub fn listener_count(&self) -> usize {
        self.device_change.len() + self.video_permission.len() + self.audio_permission.len()
    }

    fn open(&self, constraints: &StreamConstraints) -> Result<Arc<SimStream>, CaptureError> {
        let mut inner = self.inner.lock();

        let mut tracks = Vec::new();
        for kind in [MediaKind::Video, MediaKind::Audio] {
            let Some(device_id) = constraints.device_for(kind) else {
                continue;
            };
            if inner.permissions.get(&kind) == Some(&PermissionState::Denied) {
                return Err(CaptureError::PermissionDenied);
            }
            if !inner.devices.iter().any(|d| d.id == device_id && d.kind == kind) {
                return Err(CaptureError::DeviceFault(format!(
                    "{} {} is not attached",
                    kind, device_id
                )));
            }
            if inner.defective.contains(device_id) {
                return Err(CaptureError::DeviceFault(format!(
                    "could not start {}",
                    device_id
                )));
            }

            let size = inner
                .frame_sizes
                .get(device_id)
                .copied()
                .unwrap_or(DEFAULT_FRAME_SIZE);
            let delivers_frames = !inner.frameless.contains(device_id);
            tracks.push(Arc::new(SimTrack::new(
                format!("{}-{}", device_id, inner.next_stream),
                kind,
                device_id,
                size,
                delivers_frames,
            )));
        }

        if tracks.is_empty() {
            return Err(CaptureError::NoMatchingDevice);
        }

        inner.next_stream += 1;
        let stream = Arc::new(SimStream::new(
            format!("stream-{}", inner.next_stream),
            tracks,
        ));
        inner.streams.push(Arc::clone(&stream));
        Ok(stream)
    }
}

#[async_trait]
impl MediaDevices for SimulatedDevices {
    async fn enumerate_devices(&self) -> Result<Vec<Device>, CaptureError> {
        let inner = self.inner.lock();
        match inner.enumeration_failure {
            Some(ref message) => Err(CaptureError::EnumerationFailure(message.clone())),
            None => Ok(inner.devices.clone()),
        }
    }

    async fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Arc<dyn MediaStream>, CaptureError> {
        let delay = self.inner.lock().request_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.inner.lock().request_failure.clone() {
            return Err(err);
        }

        let stream = self.open(&constraints)?;
        log::debug!("sim: opened {} for {:?}", stream.id(), constraints);
        Ok(stream)
    }

    fn on_device_change(&self, listener: Listener<()>) -> Subscription {
        self.device_change.subscribe(listener)
    }

    fn on_permission_change(
        &self,
        kind: MediaKind,
        listener: Listener<PermissionState>,
    ) -> Subscription {
        self.permission_registry(kind).subscribe(listener)
    }
}
