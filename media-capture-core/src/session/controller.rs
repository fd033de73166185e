use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::machine::{CaptureMachine, Command, Message};
use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::models::state::MediaCaptureState;
use crate::recording::take::ChunkCallback;
use crate::traits::platform::Platform;

/// Options for one `record()` call.
#[derive(Clone, Default)]
pub struct RecordOptions {
    /// Overrides the configuration's recorder MIME type.
    pub mime_type: Option<String>,
    /// How often the recorder should emit a chunk.
    pub segment_hint: Option<Duration>,
    /// Called with each chunk as it arrives.
    pub on_chunk: Option<ChunkCallback>,
}

impl fmt::Debug for RecordOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordOptions")
            .field("mime_type", &self.mime_type)
            .field("segment_hint", &self.segment_hint)
            .field("on_chunk", &self.on_chunk.is_some())
            .finish()
    }
}

/// Handle to a running capture session.
///
/// The session runs on its own tokio task. Control methods enqueue a
/// request and return immediately; results show up in the published
/// [`MediaCaptureState`]. Requests that do not apply in the current status
/// are ignored.
///
/// Dropping the handle shuts the session down.
pub struct CaptureSession {
    tx: mpsc::UnboundedSender<Message>,
    state: watch::Receiver<MediaCaptureState>,
    task: Option<JoinHandle<()>>,
}

impl CaptureSession {
    /// Validate `config` and start the session on the current tokio runtime.
    pub fn start(platform: Platform, config: CaptureConfiguration) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        let runtime = Handle::try_current()
            .map_err(|e| CaptureError::ConfigurationFailed(format!("no tokio runtime: {}", e)))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(MediaCaptureState::default());
        let machine = CaptureMachine::new(platform, config, tx.clone(), state_tx);
        let task = runtime.spawn(machine.run(rx));

        Ok(Self {
            tx,
            state,
            task: Some(task),
        })
    }

    /// The latest published state.
    pub fn state(&self) -> MediaCaptureState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every published state.
    pub fn subscribe(&self) -> watch::Receiver<MediaCaptureState> {
        self.state.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    ///
    /// Returns `None` if the session shuts down first.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&MediaCaptureState) -> bool,
    ) -> Option<MediaCaptureState> {
        let mut rx = self.state.clone();
        let state = rx.wait_for(|state| predicate(state)).await.ok()?;
        Some(state.clone())
    }

    pub fn record(&self, options: RecordOptions) {
        self.command(Command::Record(options));
    }

    pub fn pause(&self) {
        self.command(Command::Pause);
    }

    pub fn resume(&self) {
        self.command(Command::Resume);
    }

    /// Stop recording. The artifact appears once the recorder has flushed.
    pub fn stop(&self) {
        self.command(Command::Stop);
    }

    /// Capture a still image from the live video.
    pub fn snap(&self) {
        self.command(Command::Snap);
    }

    /// Discard the captured artifact and return to preview.
    pub fn clear(&self) {
        self.command(Command::Clear);
    }

    pub fn select_device(&self, device_id: impl Into<String>) {
        self.command(Command::SelectDevice(device_id.into()));
    }

    /// Stop all streams and recorders and wait for the session task to end.
    pub async fn shutdown(mut self) {
        let _ = self.tx.send(Message::Shutdown);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("capture session task failed: {}", e);
            }
        }
    }

    fn command(&self, command: Command) {
        if self.tx.send(Message::Command(command)).is_err() {
            log::warn!("capture session is no longer running");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let _ = self.tx.send(Message::Shutdown);
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("status", &self.state.borrow().status)
            .field("running", &!self.tx.is_closed())
            .finish()
    }
}
