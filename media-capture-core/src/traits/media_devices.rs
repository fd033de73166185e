use std::sync::Arc;

use async_trait::async_trait;

use crate::events::{Listener, Subscription};
use crate::models::device::{Device, FrameSize, MediaKind, PermissionState};
use crate::models::error::CaptureError;

/// Which device to open for each media kind. `None` omits the kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConstraints {
    pub video_device_id: Option<String>,
    pub audio_device_id: Option<String>,
}

impl StreamConstraints {
    pub fn is_empty(&self) -> bool {
        self.video_device_id.is_none() && self.audio_device_id.is_none()
    }

    pub fn device_for(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Video => self.video_device_id.as_deref(),
            MediaKind::Audio => self.audio_device_id.as_deref(),
        }
    }
}

/// A single media channel within a stream.
#[async_trait]
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> MediaKind;

    /// Id of the device feeding this track.
    fn device_id(&self) -> &str;

    /// Current frame size. Zero until the first frame has been delivered;
    /// always zero for audio tracks.
    fn frame_size(&self) -> FrameSize;

    /// Resolves once the track has delivered its first frame.
    async fn first_frame(&self) -> Result<FrameSize, CaptureError>;

    /// Fires when the track ends on its own (device unplugged, access revoked).
    fn on_ended(&self, listener: Listener<()>) -> Subscription;

    /// Stop the track and release the device.
    fn stop(&self);
}

/// A live handle to one or more active tracks.
pub trait MediaStream: Send + Sync {
    fn id(&self) -> &str;

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>>;

    fn track(&self, kind: MediaKind) -> Option<Arc<dyn MediaTrack>> {
        self.tracks().into_iter().find(|t| t.kind() == kind)
    }

    fn stop_all(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }
}

/// The platform's device access API.
///
/// Implemented by:
/// - `SimulatedPlatform` (media-capture-sim)
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// List capture inputs in system order.
    async fn enumerate_devices(&self) -> Result<Vec<Device>, CaptureError>;

    /// Open a stream for the given devices.
    ///
    /// Fails with `PermissionDenied` when access is rejected and with
    /// `DeviceFault` when a device cannot be started.
    async fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Arc<dyn MediaStream>, CaptureError>;

    /// Fires when devices are added or removed.
    fn on_device_change(&self, listener: Listener<()>) -> Subscription;

    /// Fires when the permission for `kind` changes.
    fn on_permission_change(
        &self,
        kind: MediaKind,
        listener: Listener<PermissionState>,
    ) -> Subscription;
}
