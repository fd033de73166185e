use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::events::{Listener, Subscription};
use crate::models::artifact::Blob;
use crate::traits::recorder::{MediaRecorder, RecorderEvent};

/// Callback invoked once per recorded chunk, as it arrives.
///
/// Does not affect accumulation. Runs on the session task; keep it short.
pub type ChunkCallback = Arc<dyn Fn(&[u8]) + Send + Sync + 'static>;

/// How a take ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TakeOutcome {
    Recorded {
        blob: Blob,
        chunk_count: usize,
        duration_secs: f64,
    },
    NothingRecorded {
        duration_secs: f64,
    },
}

/// One recording cycle: a platform recorder plus the chunks it produced.
///
/// Control calls are forwarded to the recorder as fire-and-forget requests.
/// The take's own paused/stopping flags follow the requests, not the
/// recorder's acknowledgments.
pub struct Take {
    id: u64,
    recorder: Box<dyn MediaRecorder>,
    events: Option<Subscription>,
    on_chunk: Option<ChunkCallback>,
    chunks: Vec<Vec<u8>>,
    paused: bool,
    stopping: bool,
    started: Instant,
    paused_duration: Duration,
    last_pause: Option<Instant>,
    stopped_at: Option<Instant>,
}

impl Take {
    /// Subscribe to the recorder's events and ask it to start.
    pub fn start(
        id: u64,
        recorder: Box<dyn MediaRecorder>,
        segment_hint: Option<Duration>,
        on_chunk: Option<ChunkCallback>,
        listener: Listener<RecorderEvent>,
    ) -> Self {
        let events = recorder.on_event(listener);
        recorder.start(segment_hint);
        log::info!("take {} started ({})", id, recorder.mime_type());
        Self {
            id,
            recorder,
            events: Some(events),
            on_chunk,
            chunks: Vec::new(),
            paused: false,
            stopping: false,
            started: Instant::now(),
            paused_duration: Duration::ZERO,
            last_pause: None,
            stopped_at: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `false` when the take is already paused or stopping.
    pub fn pause(&mut self) -> bool {
        if self.paused || self.stopping {
            return false;
        }
        self.paused = true;
        self.last_pause = Some(Instant::now());
        self.recorder.pause();
        true
    }

    /// Returns `false` when the take is not paused or is stopping.
    pub fn resume(&mut self) -> bool {
        if !self.paused || self.stopping {
            return false;
        }
        self.paused = false;
        if let Some(pause_start) = self.last_pause.take() {
            self.paused_duration += pause_start.elapsed();
        }
        self.recorder.resume();
        true
    }

    /// Ask the recorder to stop. The take is finished when the recorder
    /// acknowledges with `Stopped`. Returns `false` if already requested.
    pub fn request_stop(&mut self) -> bool {
        if self.stopping {
            return false;
        }
        self.stopping = true;
        self.stopped_at = Some(Instant::now());
        self.recorder.stop();
        true
    }

    /// Accumulate a chunk. Every data event counts, even an empty one.
    pub fn push_chunk(&mut self, data: Vec<u8>) {
        if let Some(ref on_chunk) = self.on_chunk {
            on_chunk(&data);
        }
        self.chunks.push(data);
    }

    /// Active recording time so far, pauses excluded.
    pub fn elapsed_secs(&self) -> f64 {
        let end = self.stopped_at.unwrap_or_else(Instant::now);
        let total = end.saturating_duration_since(self.started);
        let mut paused = self.paused_duration;
        if let Some(pause_start) = self.last_pause {
            paused += end.saturating_duration_since(pause_start);
        }
        total.saturating_sub(paused).as_secs_f64()
    }

    /// Concatenate the accumulated chunks.
    pub fn finish(mut self) -> TakeOutcome {
        self.events.take();
        let duration_secs = self.elapsed_secs();
        if self.chunks.is_empty() {
            log::info!("take {} finished with no data", self.id);
            return TakeOutcome::NothingRecorded { duration_secs };
        }

        let chunk_count = self.chunks.len();
        let bytes = self.chunks.concat();
        log::info!(
            "take {} finished: {} chunk(s), {} bytes, {:.2}s",
            self.id,
            chunk_count,
            bytes.len(),
            duration_secs
        );
        TakeOutcome::Recorded {
            blob: Blob::new(bytes, self.recorder.mime_type()),
            chunk_count,
            duration_secs,
        }
    }

    /// Stop the recorder without producing anything.
    pub fn abort(mut self) {
        self.events.take();
        if !self.stopping {
            self.stopping = true;
            self.recorder.stop();
        }
        log::debug!("take {} aborted", self.id);
    }
}

impl fmt::Debug for Take {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Take")
            .field("id", &self.id)
            .field("chunks", &self.chunks.len())
            .field("paused", &self.paused)
            .field("stopping", &self.stopping)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls {
        log: Mutex<Vec<&'static str>>,
    }

    struct StubRecorder {
        calls: Arc<Calls>,
    }

    impl MediaRecorder for StubRecorder {
        fn start(&self, _segment_hint: Option<Duration>) {
            self.calls.log.lock().push("start");
        }
        fn pause(&self) {
            self.calls.log.lock().push("pause");
        }
        fn resume(&self) {
            self.calls.log.lock().push("resume");
        }
        fn stop(&self) {
            self.calls.log.lock().push("stop");
        }
        fn mime_type(&self) -> String {
            "video/webm".into()
        }
        fn on_event(&self, _listener: Listener<RecorderEvent>) -> Subscription {
            Subscription::empty()
        }
    }

    fn take_with(on_chunk: Option<ChunkCallback>) -> (Take, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let recorder = Box::new(StubRecorder {
            calls: Arc::clone(&calls),
        });
        let take = Take::start(1, recorder, None, on_chunk, Arc::new(|_| {}));
        (take, calls)
    }

    #[test]
    fn nothing_recorded_without_chunks() {
        let (mut take, calls) = take_with(None);
        assert!(take.request_stop());
        assert!(matches!(take.finish(), TakeOutcome::NothingRecorded { .. }));
        assert_eq!(*calls.log.lock(), vec!["start", "stop"]);
    }

    #[test]
    fn chunks_concatenate() {
        let (mut take, _) = take_with(None);
        take.push_chunk(vec![1, 2]);
        take.push_chunk(vec![3]);
        match take.finish() {
            TakeOutcome::Recorded {
                blob, chunk_count, ..
            } => {
                assert_eq!(blob.bytes, vec![1, 2, 3]);
                assert_eq!(blob.mime_type, "video/webm");
                assert_eq!(chunk_count, 2);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn empty_chunk_still_counts() {
        let (mut take, _) = take_with(None);
        take.push_chunk(Vec::new());
        match take.finish() {
            TakeOutcome::Recorded {
                blob, chunk_count, ..
            } => {
                assert!(blob.is_empty());
                assert_eq!(chunk_count, 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn pause_resume_keeps_chunks() {
        let (mut take, calls) = take_with(None);
        take.push_chunk(vec![9]);
        assert!(take.pause());
        assert!(!take.pause());
        assert!(take.resume());
        assert!(!take.resume());
        assert_eq!(take.chunk_count(), 1);
        assert_eq!(*calls.log.lock(), vec!["start", "pause", "resume"]);
    }

    #[test]
    fn stop_requested_once() {
        let (mut take, calls) = take_with(None);
        assert!(take.request_stop());
        assert!(!take.request_stop());
        assert!(!take.pause());
        assert_eq!(*calls.log.lock(), vec!["start", "stop"]);
    }

    #[test]
    fn on_chunk_sees_every_chunk() {
        let seen = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&seen);
        let callback: ChunkCallback = Arc::new(move |data: &[u8]| {
            s.fetch_add(data.len(), Ordering::SeqCst);
        });
        let (mut take, _) = take_with(Some(callback));
        take.push_chunk(vec![0; 3]);
        take.push_chunk(vec![0; 4]);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert_eq!(take.chunk_count(), 2);
    }

    #[test]
    fn abort_stops_recorder_unless_stopping() {
        let (take, calls) = take_with(None);
        take.abort();
        assert_eq!(*calls.log.lock(), vec!["start", "stop"]);

        let (mut take, calls) = take_with(None);
        take.request_stop();
        take.abort();
        assert_eq!(*calls.log.lock(), vec!["start", "stop"]);
    }

    #[test]
    fn paused_time_is_excluded() {
        let (mut take, _) = take_with(None);
        take.pause();
        std::thread::sleep(Duration::from_millis(30));
        assert!(take.elapsed_secs() < 0.03);
    }
}
