use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::artifact::CapturedMedia;
use super::device::Device;
use super::error::CaptureError;
use super::live::{LiveAudio, LiveVideo};

/// Capture session status.
///
/// State transitions:
/// ```text
/// uninitialized → denied ⇄ previewing → recording ⇄ paused
///                              ↑   ↓         ↓         ↓
///                              │ recorded ←──┴─────────┘
///                              └───┘ (clear)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
    Uninitialized,
    Denied,
    Previewing,
    Recording,
    Paused,
    Recorded,
}

impl CaptureStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Denied => "denied",
            Self::Previewing => "previewing",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Recorded => "recorded",
        }
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable snapshot of a capture session.
///
/// Handles are shared `Arc`s: an unchanged handle keeps its identity
/// across snapshots.
#[derive(Debug, Clone)]
pub struct MediaCaptureState {
    pub status: CaptureStatus,
    pub devices: Vec<Device>,
    pub selected_device_id: Option<String>,
    pub live_video: Option<Arc<LiveVideo>>,
    pub live_audio: Option<Arc<LiveAudio>>,
    pub captured_image: Option<Arc<CapturedMedia>>,
    pub captured_video: Option<Arc<CapturedMedia>>,
    pub captured_audio: Option<Arc<CapturedMedia>>,
    /// Active recording time of the current or last take, pauses excluded.
    pub duration_secs: f64,
    /// Last measured volume, 0–100. Only set when volume watching is on.
    pub volume: Option<u32>,
    pub last_error: Option<CaptureError>,
}

impl MediaCaptureState {
    /// Whichever artifact is currently held.
    pub fn captured(&self) -> Option<&Arc<CapturedMedia>> {
        self.captured_image
            .as_ref()
            .or(self.captured_video.as_ref())
            .or(self.captured_audio.as_ref())
    }
}

impl Default for MediaCaptureState {
    fn default() -> Self {
        Self {
            status: CaptureStatus::Uninitialized,
            devices: Vec::new(),
            selected_device_id: None,
            live_video: None,
            live_audio: None,
            captured_image: None,
            captured_video: None,
            captured_audio: None,
            duration_secs: 0.0,
            volume: None,
            last_error: None,
        }
    }
}
