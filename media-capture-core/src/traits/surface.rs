use async_trait::async_trait;

use crate::models::artifact::Blob;
use crate::models::device::FrameSize;
use crate::models::error::CaptureError;
use crate::traits::media_devices::MediaTrack;

/// An off-screen 2-D drawing surface.
#[async_trait]
pub trait DrawingSurface: Send + Sync {
    fn size(&self) -> FrameSize;

    /// Render the track's current frame onto the surface.
    fn draw_frame(&mut self, track: &dyn MediaTrack) -> Result<(), CaptureError>;

    /// Encode the surface as a blob. `Ok(None)` means the platform has no
    /// blob export path; callers fall back to [`DrawingSurface::export_data_uri`].
    async fn export_blob(&self, mime_type: &str, quality: f32)
        -> Result<Option<Blob>, CaptureError>;

    /// Encode the surface as a `data:` URI.
    async fn export_data_uri(&self, mime_type: &str, quality: f32) -> Result<String, CaptureError>;
}

pub trait SurfaceFactory: Send + Sync {
    fn create_surface(&self, size: FrameSize) -> Result<Box<dyn DrawingSurface>, CaptureError>;
}
