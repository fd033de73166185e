use crate::models::artifact::Blob;
use crate::models::device::FrameSize;
use crate::models::error::CaptureError;
use crate::processing::data_uri::decode_data_uri;
use crate::traits::media_devices::MediaTrack;
use crate::traits::surface::{DrawingSurface, SurfaceFactory};

/// Render the track's current frame and export it as an image blob.
pub async fn capture_frame(
    surfaces: &dyn SurfaceFactory,
    track: &dyn MediaTrack,
    size: FrameSize,
    mime_type: &str,
    quality: f32,
) -> Result<Blob, CaptureError> {
    if size.is_empty() {
        return Err(CaptureError::SnapshotFailed(
            "video track has not delivered a frame".into(),
        ));
    }

    let mut surface = surfaces.create_surface(size)?;
    surface.draw_frame(track)?;
    export_image(surface.as_ref(), mime_type, quality).await
}

/// Export a surface, preferring the blob path and falling back to a data URI.
pub async fn export_image(
    surface: &dyn DrawingSurface,
    mime_type: &str,
    quality: f32,
) -> Result<Blob, CaptureError> {
    if let Some(blob) = surface.export_blob(mime_type, quality).await? {
        return Ok(blob);
    }

    log::debug!("blob export unavailable, using data URI");
    let uri = surface.export_data_uri(mime_type, quality).await?;
    decode_data_uri(&uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Listener, Subscription};
    use crate::models::device::MediaKind;
    use crate::processing::data_uri::encode_data_uri;
    use async_trait::async_trait;

    struct StillTrack;

    #[async_trait]
    impl MediaTrack for StillTrack {
        fn id(&self) -> &str {
            "still"
        }
        fn kind(&self) -> MediaKind {
            MediaKind::Video
        }
        fn device_id(&self) -> &str {
            "cam"
        }
        fn frame_size(&self) -> FrameSize {
            FrameSize::new(4, 2)
        }
        async fn first_frame(&self) -> Result<FrameSize, CaptureError> {
            Ok(self.frame_size())
        }
        fn on_ended(&self, _listener: Listener<()>) -> Subscription {
            Subscription::empty()
        }
        fn stop(&self) {}
    }

    struct StubSurface {
        size: FrameSize,
        has_blob_export: bool,
        fail: bool,
        pixels: Vec<u8>,
    }

    #[async_trait]
    impl DrawingSurface for StubSurface {
        fn size(&self) -> FrameSize {
            self.size
        }
        fn draw_frame(&mut self, _track: &dyn MediaTrack) -> Result<(), CaptureError> {
            self.pixels = vec![7; (self.size.width * self.size.height) as usize];
            Ok(())
        }
        async fn export_blob(
            &self,
            mime_type: &str,
            _quality: f32,
        ) -> Result<Option<Blob>, CaptureError> {
            if self.fail {
                return Err(CaptureError::SnapshotFailed("encoder crashed".into()));
            }
            Ok(self
                .has_blob_export
                .then(|| Blob::new(self.pixels.clone(), mime_type)))
        }
        async fn export_data_uri(
            &self,
            mime_type: &str,
            _quality: f32,
        ) -> Result<String, CaptureError> {
            Ok(encode_data_uri(&Blob::new(self.pixels.clone(), mime_type)))
        }
    }

    struct StubFactory {
        has_blob_export: bool,
        fail: bool,
    }

    impl SurfaceFactory for StubFactory {
        fn create_surface(&self, size: FrameSize) -> Result<Box<dyn DrawingSurface>, CaptureError> {
            Ok(Box::new(StubSurface {
                size,
                has_blob_export: self.has_blob_export,
                fail: self.fail,
                pixels: Vec::new(),
            }))
        }
    }

    async fn snap_with(has_blob_export: bool, fail: bool) -> Result<Blob, CaptureError> {
        let factory = StubFactory {
            has_blob_export,
            fail,
        };
        capture_frame(&factory, &StillTrack, FrameSize::new(4, 2), "image/png", 0.8).await
    }

    #[tokio::test]
    async fn blob_and_data_uri_paths_agree() {
        let direct = snap_with(true, false).await.unwrap();
        let fallback = snap_with(false, false).await.unwrap();
        assert_eq!(direct, fallback);
        assert_eq!(direct.len(), 8);
        assert_eq!(direct.mime_type, "image/png");
    }

    #[tokio::test]
    async fn export_failure_is_reported() {
        let err = snap_with(true, true).await.unwrap_err();
        assert_eq!(err, CaptureError::SnapshotFailed("encoder crashed".into()));
    }

    #[tokio::test]
    async fn empty_frame_is_rejected() {
        let factory = StubFactory {
            has_blob_export: true,
            fail: false,
        };
        let result = capture_frame(&factory, &StillTrack, FrameSize::default(), "image/png", 0.8).await;
        assert!(matches!(result, Err(CaptureError::SnapshotFailed(_))));
    }
}
