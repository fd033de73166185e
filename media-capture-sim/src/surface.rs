//! Simulated drawing surfaces.
//!
//! Drawing a frame produces a small deterministic "encoded image": a
//! header, the frame box, and the id of the drawn track.

use async_trait::async_trait;
use parking_lot::Mutex;

use media_capture_core::models::artifact::Blob;
use media_capture_core::models::device::FrameSize;
use media_capture_core::models::error::CaptureError;
use media_capture_core::processing::data_uri::encode_data_uri;
use media_capture_core::traits::media_devices::MediaTrack;
use media_capture_core::traits::surface::{DrawingSurface, SurfaceFactory};

const IMAGE_MAGIC: &[u8] = b"SIMG";

#[derive(Debug, Clone, Default)]
struct SurfaceSettings {
    without_blob_export: bool,
    failure: Option<String>,
}

/// A surface holding the last drawn frame.
#[derive(Debug)]
pub struct SimSurface {
    size: FrameSize,
    settings: SurfaceSettings,
    image: Option<Vec<u8>>,
}

impl SimSurface {
    fn encoded(&self) -> Result<Vec<u8>, CaptureError> {
        if let Some(ref message) = self.settings.failure {
            return Err(CaptureError::SnapshotFailed(message.clone()));
        }
        self.image
            .clone()
            .ok_or_else(|| CaptureError::SnapshotFailed("nothing drawn".into()))
    }
}

/// Encoded bytes for a frame of `size` drawn from `track_id`.
pub fn encode_frame(size: FrameSize, track_id: &str) -> Vec<u8> {
    let mut bytes = IMAGE_MAGIC.to_vec();
    bytes.extend_from_slice(&size.width.to_le_bytes());
    bytes.extend_from_slice(&size.height.to_le_bytes());
    bytes.extend_from_slice(track_id.as_bytes());
    bytes
}

#[async_trait]
impl DrawingSurface for SimSurface {
    fn size(&self) -> FrameSize {
        self.size
    }

    fn draw_frame(&mut self, track: &dyn MediaTrack) -> Result<(), CaptureError> {
        if track.frame_size().is_empty() {
            return Err(CaptureError::SnapshotFailed(format!(
                "track {} has no frame",
                track.id()
            )));
        }
        self.image = Some(encode_frame(self.size, track.id()));
        Ok(())
    }

    async fn export_blob(
        &self,
        mime_type: &str,
        _quality: f32,
    ) -> Result<Option<Blob>, CaptureError> {
        if self.settings.without_blob_export {
            return Ok(None);
        }
        Ok(Some(Blob::new(self.encoded()?, mime_type)))
    }

    async fn export_data_uri(&self, mime_type: &str, _quality: f32) -> Result<String, CaptureError> {
        let blob = Blob::new(self.encoded()?, mime_type);
        Ok(encode_data_uri(&blob))
    }
}

/// Creates [`SimSurface`]s.
#[derive(Debug, Default)]
pub struct SimSurfaceFactory {
    settings: Mutex<SurfaceSettings>,
    created: Mutex<Vec<FrameSize>>,
}

impl SimSurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surfaces created from now on only export data URIs.
    pub fn disable_blob_export(&self) {
        self.settings.lock().without_blob_export = true;
    }

    /// Exports fail with `message`, or succeed again with `None`.
    pub fn set_failure(&self, message: Option<&str>) {
        self.settings.lock().failure = message.map(str::to_string);
    }

    /// Sizes of all surfaces created so far.
    pub fn created(&self) -> Vec<FrameSize> {
        self.created.lock().clone()
    }
}

impl SurfaceFactory for SimSurfaceFactory {
    fn create_surface(&self, size: FrameSize) -> Result<Box<dyn DrawingSurface>, CaptureError> {
        self.created.lock().push(size);
        Ok(Box::new(SimSurface {
            size,
            settings: self.settings.lock().clone(),
            image: None,
        }))
    }
}
