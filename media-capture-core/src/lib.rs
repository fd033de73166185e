//! # media-capture-core
//!
//! Platform-agnostic media capture core library.
//!
//! Discovers capture devices, keeps a live preview stream, follows hot-plug,
//! permission, rotation and track-ended events, and drives recording and
//! snapshots into a finished artifact. Platform backends implement the
//! collaborator traits in [`traits`] and are handed to a [`CaptureSession`]
//! as a [`Platform`].
//!
//! ## Architecture
//!
//! ```text
//! media-capture-core (this crate)
//! ├── traits/       ← MediaDevices, MediaStream, MediaTrack, MediaRecorder, DrawingSurface, ...
//! ├── models/       ← CaptureError, CaptureStatus, CaptureConfiguration, Device, CapturedMedia
//! ├── events        ← Listener, Subscription, EventRegistry
//! ├── devices/      ← DeviceWatcher (enumeration, change notifications)
//! ├── acquisition/  ← device matching, StreamAcquirer
//! ├── processing/   ← OrientationTracker, volume levels, data URI decoding
//! ├── recording/    ← Take (chunk accumulation), snapshot export
//! └── session/      ← CaptureSession (state machine on a tokio task)
//! ```

pub mod acquisition;
pub mod devices;
pub mod events;
pub mod models;
pub mod processing;
pub mod recording;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use acquisition::acquirer::{AcquiredMedia, StreamAcquirer};
pub use devices::watcher::{DeviceWatcher, Enumeration, WatchEvent};
pub use events::{EventRegistry, Listener, Subscription};
pub use models::artifact::{ArtifactKind, ArtifactMetadata, Blob, CapturedMedia};
pub use models::config::CaptureConfiguration;
pub use models::device::{Device, FrameSize, MediaKind, PermissionState};
pub use models::error::CaptureError;
pub use models::live::{LiveAudio, LiveVideo};
pub use models::state::{CaptureStatus, MediaCaptureState};
pub use processing::orientation::OrientationTracker;
pub use processing::volume::VolumeTracker;
pub use recording::take::ChunkCallback;
pub use session::{CaptureSession, RecordOptions};
pub use traits::media_devices::{MediaDevices, MediaStream, MediaTrack, StreamConstraints};
pub use traits::orientation::OrientationSource;
pub use traits::platform::Platform;
pub use traits::recorder::{MediaRecorder, RecorderEvent, RecorderFactory, RecorderOptions};
pub use traits::surface::{DrawingSurface, SurfaceFactory};
pub use traits::volume::VolumeMeter;
