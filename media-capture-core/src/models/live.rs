use std::fmt;
use std::sync::Arc;

use super::device::FrameSize;
use crate::traits::media_devices::MediaStream;

/// The live video preview: a stream plus the expected frame box.
///
/// Published behind an `Arc`. A new handle is created whenever the stream
/// or the box changes, so consumers can compare with `Arc::ptr_eq`.
#[derive(Clone)]
pub struct LiveVideo {
    pub stream: Arc<dyn MediaStream>,
    pub width: u32,
    pub height: u32,
    pub device_id: String,
}

impl LiveVideo {
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// Same stream, different frame box.
    pub fn resized(&self, size: FrameSize) -> Self {
        Self {
            stream: Arc::clone(&self.stream),
            width: size.width,
            height: size.height,
            device_id: self.device_id.clone(),
        }
    }
}

impl fmt::Debug for LiveVideo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveVideo")
            .field("stream", &self.stream.id())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("device_id", &self.device_id)
            .finish()
    }
}

/// The live audio stream.
#[derive(Clone)]
pub struct LiveAudio {
    pub stream: Arc<dyn MediaStream>,
    pub device_id: String,
}

impl fmt::Debug for LiveAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveAudio")
            .field("stream", &self.stream.id())
            .field("device_id", &self.device_id)
            .finish()
    }
}
