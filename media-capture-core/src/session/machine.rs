use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};

use super::controller::RecordOptions;
use super::live_set::LiveSet;
use crate::acquisition::acquirer::{AcquiredMedia, StreamAcquirer};
use crate::acquisition::matching::select_devices;
use crate::devices::watcher::{added_devices, enumerate, DeviceWatcher, Enumeration, WatchEvent};
use crate::events::Subscription;
use crate::models::artifact::{ArtifactKind, Blob, CapturedMedia};
use crate::models::config::CaptureConfiguration;
use crate::models::device::{Device, MediaKind, PermissionState};
use crate::models::error::CaptureError;
use crate::models::state::{CaptureStatus, MediaCaptureState};
use crate::processing::orientation::OrientationTracker;
use crate::recording::snapshot::capture_frame;
use crate::recording::take::{Take, TakeOutcome};
use crate::traits::platform::Platform;
use crate::traits::recorder::{RecorderEvent, RecorderOptions};

/// How often `duration_secs` is republished while recording.
const DURATION_TICK: Duration = Duration::from_millis(250);

/// Control requests from the [`CaptureSession`](super::CaptureSession) handle.
pub(crate) enum Command {
    Record(RecordOptions),
    Pause,
    Resume,
    Stop,
    Snap,
    Clear,
    SelectDevice(String),
}

/// Everything the session task reacts to, in arrival order.
pub(crate) enum Message {
    Command(Command),
    Watch(WatchEvent),
    Orientation(u16),
    TrackEnded {
        stream_id: String,
    },
    Recorder {
        take_id: u64,
        event: RecorderEvent,
    },
    Volume {
        stream_id: String,
        level: u32,
    },
    Enumerated {
        generation: u64,
        enumeration: Enumeration,
    },
    Acquired {
        generation: u64,
        result: Result<AcquiredMedia, CaptureError>,
    },
    Snapped {
        generation: u64,
        result: Result<Blob, CaptureError>,
    },
    Shutdown,
}

/// Internal phase. The published status is derived from it.
enum Phase {
    Uninitialized,
    Denied,
    /// `None` while a reacquisition is pending after the stream ended.
    Previewing(Option<LiveSet>),
    Recording {
        live: LiveSet,
        take: Take,
        /// The live stream ended mid-take.
        ended: bool,
    },
    Recorded {
        artifact: Arc<CapturedMedia>,
        /// The preview stream, kept until it ends or the artifact is cleared.
        retained: Option<LiveSet>,
    },
}

impl Phase {
    fn status(&self) -> CaptureStatus {
        match self {
            Self::Uninitialized => CaptureStatus::Uninitialized,
            Self::Denied => CaptureStatus::Denied,
            Self::Previewing(_) => CaptureStatus::Previewing,
            Self::Recording { take, .. } if take.is_paused() => CaptureStatus::Paused,
            Self::Recording { .. } => CaptureStatus::Recording,
            Self::Recorded { .. } => CaptureStatus::Recorded,
        }
    }

    /// Phases in which a freshly acquired stream may be installed.
    fn accepts_stream(&self) -> bool {
        matches!(
            self,
            Self::Uninitialized | Self::Denied | Self::Previewing(_)
        )
    }

    fn live(&self) -> Option<&LiveSet> {
        match self {
            Self::Previewing(live) => live.as_ref(),
            Self::Recording { live, .. } => Some(live),
            Self::Recorded { retained, .. } => retained.as_ref(),
            Self::Uninitialized | Self::Denied => None,
        }
    }

    fn live_mut(&mut self) -> Option<&mut LiveSet> {
        match self {
            Self::Previewing(live) => live.as_mut(),
            Self::Recording { live, .. } => Some(live),
            Self::Recorded { retained, .. } => retained.as_mut(),
            Self::Uninitialized | Self::Denied => None,
        }
    }
}

/// The capture state machine. Runs on one task and owns every platform
/// handle; all mutation happens in response to a [`Message`].
pub(crate) struct CaptureMachine {
    platform: Platform,
    config: CaptureConfiguration,
    acquirer: StreamAcquirer,
    watcher: DeviceWatcher,
    orientation: OrientationTracker,
    orientation_sub: Option<Subscription>,
    tx: mpsc::UnboundedSender<Message>,
    state_tx: watch::Sender<MediaCaptureState>,

    phase: Phase,
    devices: Vec<Device>,
    selected_device_id: Option<String>,
    last_error: Option<CaptureError>,
    duration_secs: f64,
    volume: Option<u32>,

    enumerate_generation: u64,
    acquire_generation: u64,
    acquiring: bool,
    acquire_again: bool,
    snap_generation: u64,
    next_take_id: u64,
}

impl CaptureMachine {
    pub(crate) fn new(
        platform: Platform,
        config: CaptureConfiguration,
        tx: mpsc::UnboundedSender<Message>,
        state_tx: watch::Sender<MediaCaptureState>,
    ) -> Self {
        let acquirer = StreamAcquirer::new(Arc::clone(&platform.devices));
        let watcher = DeviceWatcher::new(Arc::clone(&platform.devices));
        let angle = platform
            .orientation
            .as_ref()
            .map_or(0, |source| source.current_angle());

        Self {
            platform,
            config,
            acquirer,
            watcher,
            orientation: OrientationTracker::new(angle),
            orientation_sub: None,
            tx,
            state_tx,
            phase: Phase::Uninitialized,
            devices: Vec::new(),
            selected_device_id: None,
            last_error: None,
            duration_secs: 0.0,
            volume: None,
            enumerate_generation: 0,
            acquire_generation: 0,
            acquiring: false,
            acquire_again: false,
            snap_generation: 0,
            next_take_id: 0,
        }
    }

    /// Drain the queue until shutdown, then release everything.
    pub(crate) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>) {
        self.start();

        let mut ticker = interval(DURATION_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let recording = self.phase.status() == CaptureStatus::Recording;
            tokio::select! {
                message = rx.recv() => match message {
                    Some(Message::Shutdown) | None => break,
                    Some(message) => self.handle(message),
                },
                _ = ticker.tick(), if recording => self.publish(),
            }
        }

        self.teardown();

        // Completions that raced the shutdown still carry streams.
        rx.close();
        while let Ok(message) = rx.try_recv() {
            if let Message::Acquired {
                result: Ok(media), ..
            } = message
            {
                media.discard();
            }
        }
    }

    fn start(&mut self) {
        let tx = self.tx.clone();
        self.watcher.watch(
            &self.config.requested_kinds(),
            Arc::new(move |event| {
                let _ = tx.send(Message::Watch(event));
            }),
        );

        if let Some(source) = self.platform.orientation.clone() {
            let tx = self.tx.clone();
            self.orientation_sub = Some(source.on_orientation_change(Arc::new(move |angle| {
                let _ = tx.send(Message::Orientation(angle));
            })));
        }

        log::info!(
            "capture session started (video: {}, audio: {})",
            self.config.video,
            self.config.audio
        );
        self.refresh();
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Command(command) => self.on_command(command),
            Message::Watch(event) => self.on_watch(event),
            Message::Orientation(angle) => self.on_orientation(angle),
            Message::TrackEnded { stream_id } => self.on_track_ended(&stream_id),
            Message::Recorder { take_id, event } => self.on_recorder(take_id, event),
            Message::Volume { stream_id, level } => self.on_volume(&stream_id, level),
            Message::Enumerated {
                generation,
                enumeration,
            } => self.on_enumerated(generation, enumeration),
            Message::Acquired { generation, result } => self.on_acquired(generation, result),
            Message::Snapped { generation, result } => self.on_snapped(generation, result),
            Message::Shutdown => {}
        }
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Record(options) => self.record(options),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Stop => self.stop(),
            Command::Snap => self.snap(),
            Command::Clear => self.clear(),
            Command::SelectDevice(id) => self.select_device(id),
        }
    }

    // --- Devices ---

    /// Re-enumerate in the background. Only the latest enumeration applies.
    fn refresh(&mut self) {
        self.enumerate_generation += 1;
        let generation = self.enumerate_generation;
        let devices = Arc::clone(&self.platform.devices);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let enumeration = enumerate(devices.as_ref()).await;
            let _ = tx.send(Message::Enumerated {
                generation,
                enumeration,
            });
        });
    }

    fn on_watch(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::DevicesChanged => {
                log::debug!("device list changed");
                self.refresh();
            }
            WatchEvent::PermissionChanged(kind, PermissionState::Denied) => {
                if !self.config.wants(kind) {
                    return;
                }
                log::warn!("{} permission revoked", kind);
                if self.phase.accepts_stream() {
                    self.deny(CaptureError::PermissionDenied);
                    self.publish();
                }
            }
            WatchEvent::PermissionChanged(kind, state) => {
                log::debug!("{} permission is now {:?}", kind, state);
                self.refresh();
            }
        }
    }

    fn on_enumerated(&mut self, generation: u64, enumeration: Enumeration) {
        if generation != self.enumerate_generation {
            log::debug!("ignoring stale enumeration {}", generation);
            return;
        }

        let previous = mem::replace(&mut self.devices, enumeration.devices);
        log::debug!("enumerated {} device(s)", self.devices.len());

        if !self.phase.accepts_stream() {
            self.publish();
            return;
        }

        if let Some(err) = enumeration.error {
            self.deny(err);
            self.publish();
            return;
        }

        let mut reacquire = false;
        if let Phase::Previewing(live) = &self.phase {
            if self.config.select_new_device {
                let primary = self.config.primary_kind();
                let added = added_devices(&previous, &self.devices)
                    .into_iter()
                    .find(|d| d.kind == primary)
                    .map(|d| d.id.clone());
                if let Some(id) = added {
                    if self.selected_device_id.as_deref() != Some(id.as_str()) {
                        log::info!("selecting newly attached device {}", id);
                        self.selected_device_id = Some(id);
                        reacquire = true;
                    }
                }
            }

            match live {
                None => reacquire = true,
                Some(live) => {
                    let known = |id: &str| self.devices.iter().any(|d| d.id == id);
                    let lost_video = live.video().is_some_and(|v| !known(&v.device_id));
                    let lost_audio = live.audio().is_some_and(|a| !known(&a.device_id));
                    if lost_video || lost_audio {
                        log::info!("live device disappeared, falling back");
                        reacquire = true;
                    }
                }
            }
        } else {
            reacquire = true;
        }

        if reacquire {
            self.reacquire();
        }
        self.publish();
    }

    // --- Acquisition ---

    /// Check that something can be matched, then acquire. Goes straight to
    /// denied when nothing matches.
    fn reacquire(&mut self) {
        if let Err(err) = select_devices(
            &self.devices,
            &self.config,
            self.selected_device_id.as_deref(),
        ) {
            self.deny(err);
            return;
        }
        self.request_acquisition();
    }

    /// Supersede any in-flight acquisition. Only one runs at a time; a
    /// request made while one is running relaunches after it completes.
    fn request_acquisition(&mut self) {
        self.acquire_generation += 1;
        if self.acquiring {
            self.acquire_again = true;
            return;
        }
        self.launch_acquisition();
    }

    fn launch_acquisition(&mut self) {
        self.acquiring = true;
        let generation = self.acquire_generation;
        let acquirer = self.acquirer.clone();
        let devices = self.devices.clone();
        let config = self.config.clone();
        let device_id = self.selected_device_id.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = acquirer
                .acquire(&devices, &config, device_id.as_deref())
                .await;
            if let Err(mpsc::error::SendError(message)) =
                tx.send(Message::Acquired { generation, result })
            {
                if let Message::Acquired {
                    result: Ok(media), ..
                } = message
                {
                    media.discard();
                }
            }
        });
    }

    fn on_acquired(&mut self, generation: u64, result: Result<AcquiredMedia, CaptureError>) {
        self.acquiring = false;
        let relaunch = mem::take(&mut self.acquire_again);

        if generation != self.acquire_generation || !self.phase.accepts_stream() {
            log::debug!("discarding superseded acquisition {}", generation);
            if let Ok(media) = result {
                media.discard();
            }
            if relaunch && self.phase.accepts_stream() {
                self.launch_acquisition();
            }
            return;
        }

        match result {
            Ok(media) => self.install(media),
            Err(err) if err.is_denial() => self.deny(err),
            Err(err) => {
                log::error!("acquisition failed: {}", err);
                self.last_error = Some(err);
            }
        }
        self.publish();
    }

    /// Make `media` the live stream. The previous stream is stopped only
    /// after the new one is in place.
    fn install(&mut self, media: AcquiredMedia) {
        let mut live = LiveSet::new(media);
        let stream_id = live.stream_id().to_string();

        for track in live.stream().tracks() {
            let tx = self.tx.clone();
            let stream_id = stream_id.clone();
            live.hold(track.on_ended(Arc::new(move |()| {
                let _ = tx.send(Message::TrackEnded {
                    stream_id: stream_id.clone(),
                });
            })));
        }

        self.volume = None;
        if self.config.watch_volume && live.audio().is_some() {
            self.watch_volume(&mut live);
        }

        let keep_selection = self
            .selected_device_id
            .as_deref()
            .is_some_and(|id| live.uses_device(id));
        if !keep_selection {
            self.selected_device_id = live.primary_device_id().map(str::to_string);
        }

        log::info!(
            "previewing stream {} on {:?}",
            stream_id,
            self.selected_device_id
        );
        self.last_error = None;
        let previous = mem::replace(&mut self.phase, Phase::Previewing(Some(live)));
        drop(previous);
    }

    fn watch_volume(&mut self, live: &mut LiveSet) {
        let Some(meter) = self.platform.volume.clone() else {
            log::warn!("volume watching requested but no meter is available");
            return;
        };
        let tx = self.tx.clone();
        let stream_id = live.stream_id().to_string();
        match meter.watch(
            Arc::clone(live.stream()),
            Arc::new(move |level| {
                let _ = tx.send(Message::Volume {
                    stream_id: stream_id.clone(),
                    level,
                });
            }),
        ) {
            Ok(subscription) => live.set_volume_watch(subscription),
            Err(err) => log::warn!("could not attach volume meter: {}", err),
        }
    }

    /// Enter denied, releasing any live stream and invalidating in-flight
    /// acquisitions.
    fn deny(&mut self, err: CaptureError) {
        log::warn!("capture denied: {}", err);
        self.acquire_generation += 1;
        self.acquire_again = false;
        self.volume = None;
        self.last_error = Some(err);
        self.phase = Phase::Denied;
    }

    fn on_track_ended(&mut self, stream_id: &str) {
        if self.phase.live().map(LiveSet::stream_id) != Some(stream_id) {
            log::debug!("ignoring end of stale stream {}", stream_id);
            return;
        }
        log::info!("stream {} ended", stream_id);

        match &mut self.phase {
            Phase::Previewing(live) => {
                live.take();
                self.volume = None;
                self.refresh();
                self.publish();
            }
            Phase::Recording { ended, .. } => {
                *ended = true;
                self.stop();
            }
            Phase::Recorded { retained, .. } => {
                retained.take();
                self.volume = None;
                self.publish();
            }
            Phase::Uninitialized | Phase::Denied => {}
        }
    }

    // --- Recording ---

    fn record(&mut self, options: RecordOptions) {
        let Phase::Previewing(Some(live)) = &self.phase else {
            log::warn!("record() ignored while {}", self.phase.status());
            return;
        };

        let recorder_options = RecorderOptions {
            mime_type: options.mime_type.or_else(|| self.config.mime_type.clone()),
        };
        let recorder = match self
            .platform
            .recorders
            .create_recorder(Arc::clone(live.stream()), recorder_options)
        {
            Ok(recorder) => recorder,
            Err(err) => {
                log::error!("could not create recorder: {}", err);
                self.last_error = Some(err);
                self.publish();
                return;
            }
        };

        self.next_take_id += 1;
        let take_id = self.next_take_id;
        let tx = self.tx.clone();
        let take = Take::start(
            take_id,
            recorder,
            options.segment_hint,
            options.on_chunk,
            Arc::new(move |event| {
                let _ = tx.send(Message::Recorder { take_id, event });
            }),
        );

        // A snapshot still in flight no longer applies.
        self.snap_generation += 1;
        self.duration_secs = 0.0;

        match mem::replace(&mut self.phase, Phase::Uninitialized) {
            Phase::Previewing(Some(live)) => {
                self.phase = Phase::Recording {
                    live,
                    take,
                    ended: false,
                };
            }
            other => {
                self.phase = other;
                take.abort();
            }
        }
        self.publish();
    }

    fn pause(&mut self) {
        let paused = match &mut self.phase {
            Phase::Recording { take, .. } => take.pause(),
            _ => false,
        };
        if paused {
            log::info!("take {} paused", self.next_take_id);
            self.publish();
        } else {
            log::warn!("pause() ignored while {}", self.phase.status());
        }
    }

    fn resume(&mut self) {
        let resumed = match &mut self.phase {
            Phase::Recording { take, .. } => take.resume(),
            _ => false,
        };
        if resumed {
            log::info!("take {} resumed", self.next_take_id);
            self.publish();
        } else {
            log::warn!("resume() ignored while {}", self.phase.status());
        }
    }

    /// Ask the recorder to stop. The take is finalized on its `Stopped`
    /// acknowledgment.
    fn stop(&mut self) {
        let stopping = match &mut self.phase {
            Phase::Recording { take, .. } => take.request_stop(),
            _ => {
                log::warn!("stop() ignored while {}", self.phase.status());
                return;
            }
        };
        if stopping {
            log::info!("take {} stopping", self.next_take_id);
            self.publish();
        }
    }

    fn on_recorder(&mut self, take_id: u64, event: RecorderEvent) {
        let Phase::Recording { take, .. } = &mut self.phase else {
            log::debug!("recorder event for finished take {}: {:?}", take_id, event);
            return;
        };
        if take.id() != take_id {
            log::debug!("recorder event for old take {}: {:?}", take_id, event);
            return;
        }

        match event {
            RecorderEvent::DataAvailable(data) => take.push_chunk(data),
            RecorderEvent::Stopped => self.finish_take(None),
            RecorderEvent::Error(message) => {
                log::error!("recorder error on take {}: {}", take_id, message);
                take.request_stop();
                self.finish_take(Some(CaptureError::RecorderFailed(message)));
            }
            RecorderEvent::Started | RecorderEvent::Paused | RecorderEvent::Resumed => {
                log::debug!("take {} acknowledged {:?}", take_id, event);
            }
        }
    }

    fn finish_take(&mut self, error: Option<CaptureError>) {
        let (live, take, ended) = match mem::replace(&mut self.phase, Phase::Uninitialized) {
            Phase::Recording { live, take, ended } => (live, take, ended),
            other => {
                self.phase = other;
                return;
            }
        };

        match take.finish() {
            TakeOutcome::Recorded {
                blob,
                chunk_count,
                duration_secs,
            } => {
                self.duration_secs = duration_secs;
                let kind = if live.video().is_some() {
                    ArtifactKind::Video
                } else {
                    ArtifactKind::Audio
                };
                let artifact = CapturedMedia::recording(
                    kind,
                    blob,
                    duration_secs,
                    live.video_size(),
                    chunk_count,
                    live.primary_device_id().map(str::to_string),
                );
                let retained = if ended {
                    self.volume = None;
                    drop(live);
                    None
                } else {
                    Some(live)
                };
                self.phase = Phase::Recorded {
                    artifact: Arc::new(artifact),
                    retained,
                };
            }
            TakeOutcome::NothingRecorded { duration_secs } => {
                self.duration_secs = duration_secs;
                if ended {
                    self.volume = None;
                    drop(live);
                    self.phase = Phase::Previewing(None);
                    self.refresh();
                } else {
                    self.phase = Phase::Previewing(Some(live));
                    self.follow_selection();
                }
            }
        }

        if error.is_some() {
            self.last_error = error;
        }
        self.publish();
    }

    // --- Snapshot ---

    fn snap(&mut self) {
        let Phase::Previewing(Some(live)) = &self.phase else {
            log::warn!("snap() ignored while {}", self.phase.status());
            return;
        };

        let (Some(video), Some(track)) = (live.video(), live.stream().track(MediaKind::Video))
        else {
            self.last_error = Some(CaptureError::SnapshotFailed(
                "no live video to capture".into(),
            ));
            self.publish();
            return;
        };

        self.snap_generation += 1;
        let generation = self.snap_generation;
        let size = video.size();
        let surfaces = Arc::clone(&self.platform.surfaces);
        let mime_type = self.config.image_mime_type.clone();
        let quality = self.config.image_quality;
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result =
                capture_frame(surfaces.as_ref(), track.as_ref(), size, &mime_type, quality).await;
            let _ = tx.send(Message::Snapped { generation, result });
        });
    }

    fn on_snapped(&mut self, generation: u64, result: Result<Blob, CaptureError>) {
        if generation != self.snap_generation {
            log::debug!("discarding superseded snapshot {}", generation);
            return;
        }
        let Phase::Previewing(Some(_)) = &self.phase else {
            log::debug!("discarding snapshot taken before {}", self.phase.status());
            return;
        };

        match result {
            Ok(blob) => {
                let Phase::Previewing(Some(live)) =
                    mem::replace(&mut self.phase, Phase::Previewing(None))
                else {
                    return;
                };
                let size = live.video_size().unwrap_or_default();
                let device_id = live.primary_device_id().map(str::to_string);
                log::info!("snapshot captured: {} bytes", blob.len());
                self.last_error = None;
                self.duration_secs = 0.0;
                self.phase = Phase::Recorded {
                    artifact: Arc::new(CapturedMedia::image(blob, size, device_id)),
                    retained: Some(live),
                };
            }
            Err(err) => {
                log::error!("snapshot failed: {}", err);
                self.last_error = Some(err);
            }
        }
        self.publish();
    }

    // --- Selection and clearing ---

    /// Discard the artifact and acquire a fresh stream.
    fn clear(&mut self) {
        if !matches!(self.phase, Phase::Recorded { .. }) {
            log::warn!("clear() ignored while {}", self.phase.status());
            return;
        }
        log::info!("clearing captured media");
        self.volume = None;
        self.duration_secs = 0.0;
        self.phase = Phase::Previewing(None);
        self.reacquire();
        self.publish();
    }

    /// Reacquire if a device selected while capturing is not the live one.
    fn follow_selection(&mut self) {
        let Phase::Previewing(Some(live)) = &self.phase else {
            return;
        };
        let Some(id) = self.selected_device_id.as_deref() else {
            return;
        };
        if live.uses_device(id) || !self.devices.iter().any(|d| d.id == id) {
            return;
        }
        log::info!("switching to device {} selected while capturing", id);
        self.reacquire();
    }

    fn select_device(&mut self, id: String) {
        match &self.phase {
            Phase::Recording { .. } => {
                log::warn!("select_device() ignored while {}", self.phase.status());
            }
            Phase::Recorded { .. } | Phase::Uninitialized => {
                self.selected_device_id = Some(id);
                self.publish();
            }
            Phase::Previewing(live) => {
                if live.as_ref().is_some_and(|l| l.uses_device(&id)) {
                    log::debug!("device {} already live", id);
                    return;
                }
                log::info!("switching to device {}", id);
                self.selected_device_id = Some(id);
                self.reacquire();
                self.publish();
            }
            Phase::Denied => {
                log::info!("retrying with device {}", id);
                self.selected_device_id = Some(id);
                self.reacquire();
                self.publish();
            }
        }
    }

    // --- Orientation and volume ---

    fn on_orientation(&mut self, angle: u16) {
        let current = self.phase.live().and_then(LiveSet::video_size);
        let Some(current) = current else {
            self.orientation.update(angle);
            return;
        };

        if let Some(size) = self.orientation.rotate(angle, current) {
            log::debug!("orientation {}°, frame box now {:?}", angle, size);
            if let Some(live) = self.phase.live_mut() {
                live.resize_video(size);
            }
            self.publish();
        }
    }

    fn on_volume(&mut self, stream_id: &str, level: u32) {
        let current = self
            .phase
            .live()
            .filter(|live| live.is_watching_volume())
            .map(LiveSet::stream_id);
        if current != Some(stream_id) || self.volume == Some(level) {
            return;
        }
        self.volume = Some(level);
        self.publish();
    }

    // --- State ---

    fn publish(&self) {
        let live = match &self.phase {
            Phase::Recording { ended: true, .. } => None,
            phase => phase.live(),
        };
        let (captured_image, captured_video, captured_audio) = match &self.phase {
            Phase::Recorded { artifact, .. } => match artifact.kind {
                ArtifactKind::Image => (Some(Arc::clone(artifact)), None, None),
                ArtifactKind::Video => (None, Some(Arc::clone(artifact)), None),
                ArtifactKind::Audio => (None, None, Some(Arc::clone(artifact))),
            },
            _ => (None, None, None),
        };
        let duration_secs = match &self.phase {
            Phase::Recording { take, .. } => take.elapsed_secs(),
            _ => self.duration_secs,
        };

        self.state_tx.send_replace(MediaCaptureState {
            status: self.phase.status(),
            devices: self.devices.clone(),
            selected_device_id: self.selected_device_id.clone(),
            live_video: live.and_then(|l| l.video().cloned()),
            live_audio: live.and_then(|l| l.audio().cloned()),
            captured_image,
            captured_video,
            captured_audio,
            duration_secs,
            volume: self.volume,
            last_error: self.last_error.clone(),
        });
    }

    /// Stop every held stream and recorder and detach all subscriptions.
    fn teardown(&mut self) {
        self.watcher.detach();
        self.orientation_sub.take();
        self.acquire_generation += 1;
        self.snap_generation += 1;

        match mem::replace(&mut self.phase, Phase::Uninitialized) {
            Phase::Recording { live, take, .. } => {
                take.abort();
                drop(live);
            }
            other => drop(other),
        }
        self.volume = None;
        self.publish();
        log::info!("capture session shut down");
    }
}
