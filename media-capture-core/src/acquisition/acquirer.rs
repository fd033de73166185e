use std::fmt;
use std::sync::Arc;

use super::matching::{select_devices, DeviceSelection};
use crate::models::config::CaptureConfiguration;
use crate::models::device::{Device, FrameSize, MediaKind};
use crate::models::error::CaptureError;
use crate::traits::media_devices::{MediaDevices, MediaStream};

/// A stream that has been opened and, for video, has delivered its first frame.
pub struct AcquiredMedia {
    pub stream: Arc<dyn MediaStream>,
    pub selection: DeviceSelection,
    /// `(device id, first frame size)` of the video track, if any.
    pub video: Option<(String, FrameSize)>,
    /// Device id of the audio track, if any.
    pub audio: Option<String>,
}

impl AcquiredMedia {
    /// Stop a stream that will not be used.
    pub fn discard(self) {
        log::debug!("discarding stream {}", self.stream.id());
        self.stream.stop_all();
    }
}

impl fmt::Debug for AcquiredMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquiredMedia")
            .field("stream", &self.stream.id())
            .field("video", &self.video)
            .field("audio", &self.audio)
            .finish()
    }
}

/// Opens capture streams for a configuration and device preference.
#[derive(Clone)]
pub struct StreamAcquirer {
    devices: Arc<dyn MediaDevices>,
}

impl StreamAcquirer {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self { devices }
    }

    /// Select devices from `devices`, open a stream and wait for the first
    /// video frame so the frame box is known.
    ///
    /// If waiting for the first frame fails the stream is stopped before the
    /// error is returned.
    pub async fn acquire(
        &self,
        devices: &[Device],
        config: &CaptureConfiguration,
        device_id: Option<&str>,
    ) -> Result<AcquiredMedia, CaptureError> {
        let selection = select_devices(devices, config, device_id)?;
        log::debug!(
            "requesting stream: video={:?} audio={:?}",
            selection.video.as_ref().map(|d| d.id.as_str()),
            selection.audio.as_ref().map(|d| d.id.as_str())
        );

        let stream = self.devices.request_stream(selection.constraints()).await?;

        let video = match stream.track(MediaKind::Video) {
            Some(track) => match track.first_frame().await {
                Ok(size) => Some((track.device_id().to_string(), size)),
                Err(err) => {
                    log::warn!("video track {} never delivered a frame: {}", track.id(), err);
                    stream.stop_all();
                    return Err(err);
                }
            },
            None => None,
        };
        let audio = stream
            .track(MediaKind::Audio)
            .map(|track| track.device_id().to_string());

        if video.is_none() && audio.is_none() {
            stream.stop_all();
            return Err(CaptureError::DeviceFault("stream has no tracks".into()));
        }

        log::info!(
            "acquired stream {} (video: {:?}, audio: {:?})",
            stream.id(),
            video,
            audio
        );
        Ok(AcquiredMedia {
            stream,
            selection,
            video,
            audio,
        })
    }
}
