use std::fmt;
use std::sync::Arc;

use crate::acquisition::acquirer::AcquiredMedia;
use crate::events::Subscription;
use crate::models::device::FrameSize;
use crate::models::live::{LiveAudio, LiveVideo};
use crate::traits::media_devices::MediaStream;

/// The stream currently held by the session and the handles published for it.
///
/// Owns the stream: dropping the set detaches its subscriptions and stops
/// every track. Video and audio handles share the stream when it carries
/// both kinds, so it is stopped once.
pub(crate) struct LiveSet {
    stream: Arc<dyn MediaStream>,
    video: Option<Arc<LiveVideo>>,
    audio: Option<Arc<LiveAudio>>,
    subscriptions: Vec<Subscription>,
    volume: Option<Subscription>,
}

impl LiveSet {
    pub(crate) fn new(media: AcquiredMedia) -> Self {
        let AcquiredMedia {
            stream,
            video,
            audio,
            ..
        } = media;

        let video = video.map(|(device_id, size)| {
            Arc::new(LiveVideo {
                stream: Arc::clone(&stream),
                width: size.width,
                height: size.height,
                device_id,
            })
        });
        let audio = audio.map(|device_id| {
            Arc::new(LiveAudio {
                stream: Arc::clone(&stream),
                device_id,
            })
        });

        Self {
            stream,
            video,
            audio,
            subscriptions: Vec::new(),
            volume: None,
        }
    }

    pub(crate) fn stream(&self) -> &Arc<dyn MediaStream> {
        &self.stream
    }

    pub(crate) fn stream_id(&self) -> &str {
        self.stream.id()
    }

    pub(crate) fn video(&self) -> Option<&Arc<LiveVideo>> {
        self.video.as_ref()
    }

    pub(crate) fn audio(&self) -> Option<&Arc<LiveAudio>> {
        self.audio.as_ref()
    }

    pub(crate) fn video_size(&self) -> Option<FrameSize> {
        self.video.as_ref().map(|v| v.size())
    }

    /// Video device if there is one, else the audio device.
    pub(crate) fn primary_device_id(&self) -> Option<&str> {
        self.video
            .as_ref()
            .map(|v| v.device_id.as_str())
            .or_else(|| self.audio.as_ref().map(|a| a.device_id.as_str()))
    }

    pub(crate) fn uses_device(&self, device_id: &str) -> bool {
        self.video.as_ref().is_some_and(|v| v.device_id == device_id)
            || self.audio.as_ref().is_some_and(|a| a.device_id == device_id)
    }

    /// Replace the video handle with one for `size`. Same stream, new `Arc`.
    pub(crate) fn resize_video(&mut self, size: FrameSize) {
        if let Some(video) = self.video.as_mut() {
            *video = Arc::new(video.resized(size));
        }
    }

    pub(crate) fn hold(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub(crate) fn set_volume_watch(&mut self, subscription: Subscription) {
        self.volume = Some(subscription);
    }

    pub(crate) fn is_watching_volume(&self) -> bool {
        self.volume.is_some()
    }
}

impl Drop for LiveSet {
    fn drop(&mut self) {
        self.volume.take();
        self.subscriptions.clear();
        log::debug!("releasing stream {}", self.stream.id());
        self.stream.stop_all();
    }
}

impl fmt::Debug for LiveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveSet")
            .field("stream", &self.stream.id())
            .field("video", &self.video)
            .field("audio", &self.audio)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Listener;
    use crate::models::device::MediaKind;
    use crate::models::error::CaptureError;
    use crate::traits::media_devices::MediaTrack;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTrack {
        kind: MediaKind,
        stops: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MediaTrack for CountingTrack {
        fn id(&self) -> &str {
            "t"
        }
        fn kind(&self) -> MediaKind {
            self.kind
        }
        fn device_id(&self) -> &str {
            "dev"
        }
        fn frame_size(&self) -> FrameSize {
            FrameSize::default()
        }
        async fn first_frame(&self) -> Result<FrameSize, CaptureError> {
            Ok(FrameSize::default())
        }
        fn on_ended(&self, _listener: Listener<()>) -> Subscription {
            Subscription::empty()
        }
        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct TwoTrackStream {
        tracks: Vec<Arc<dyn MediaTrack>>,
    }

    impl MediaStream for TwoTrackStream {
        fn id(&self) -> &str {
            "s"
        }
        fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
            self.tracks.clone()
        }
    }

    fn live_set(stops: &Arc<AtomicUsize>) -> LiveSet {
        let tracks: Vec<Arc<dyn MediaTrack>> = [MediaKind::Video, MediaKind::Audio]
            .into_iter()
            .map(|kind| {
                Arc::new(CountingTrack {
                    kind,
                    stops: Arc::clone(stops),
                }) as Arc<dyn MediaTrack>
            })
            .collect();
        LiveSet::new(AcquiredMedia {
            stream: Arc::new(TwoTrackStream { tracks }),
            selection: Default::default(),
            video: Some(("cam".into(), FrameSize::new(640, 480))),
            audio: Some("mic".into()),
        })
    }

    #[test]
    fn shared_stream_stopped_once_on_drop() {
        let stops = Arc::new(AtomicUsize::new(0));
        let live = live_set(&stops);
        assert!(Arc::ptr_eq(
            &live.video().unwrap().stream,
            &live.audio().unwrap().stream
        ));

        drop(live);
        assert_eq!(stops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn resize_keeps_stream_and_replaces_handle() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut live = live_set(&stops);
        let before = Arc::clone(live.video().unwrap());

        live.resize_video(FrameSize::new(480, 640));

        let after = live.video().unwrap();
        assert!(!Arc::ptr_eq(&before, after));
        assert_eq!(after.size(), FrameSize::new(480, 640));
        assert_eq!(stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn primary_device_prefers_video() {
        let stops = Arc::new(AtomicUsize::new(0));
        let live = live_set(&stops);
        assert_eq!(live.primary_device_id(), Some("cam"));
        assert!(live.uses_device("mic"));
        assert!(!live.uses_device("other"));
    }
}
