use serde::{Deserialize, Serialize};

use super::device::MediaKind;

/// Configuration for a capture session.
///
/// Supplied once when the session starts. Changing any field means
/// starting a new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfiguration {
    /// Capture video (default: true).
    pub video: bool,

    /// Capture audio (default: true).
    pub audio: bool,

    /// `"front"`, `"back"`, or a device id. Matched against device ids
    /// first, then as a case-insensitive label substring.
    pub preferred_device: Option<String>,

    /// Switch to newly plugged-in devices while previewing (default: true).
    pub select_new_device: bool,

    /// Attach the volume meter to the live audio stream (default: false).
    pub watch_volume: bool,

    /// Container hint handed to the platform recorder.
    pub mime_type: Option<String>,

    /// Image format used by `snap()` (default: `image/jpeg`).
    pub image_mime_type: String,

    /// Encoder quality for `snap()`, 0.0–1.0 (default: 0.9).
    pub image_quality: f32,
}

impl CaptureConfiguration {
    pub fn video_only() -> Self {
        Self {
            audio: false,
            ..Self::default()
        }
    }

    pub fn audio_only() -> Self {
        Self {
            video: false,
            ..Self::default()
        }
    }

    /// Parse a configuration supplied by the host as JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.video && !self.audio {
            return Err("at least one of video or audio must be requested".into());
        }
        if !(0.0..=1.0).contains(&self.image_quality) {
            return Err(format!("image quality out of range: {}", self.image_quality));
        }
        if !self.image_mime_type.starts_with("image/") {
            return Err(format!("not an image type: {}", self.image_mime_type));
        }
        Ok(())
    }

    /// Media kinds this configuration asks for, video first.
    pub fn requested_kinds(&self) -> Vec<MediaKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.video {
            kinds.push(MediaKind::Video);
        }
        if self.audio {
            kinds.push(MediaKind::Audio);
        }
        kinds
    }

    /// The kind whose device drives `selected_device_id` and the hot-plug policy.
    pub fn primary_kind(&self) -> MediaKind {
        if self.video {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }

    pub fn wants(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Video => self.video,
            MediaKind::Audio => self.audio,
        }
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
            preferred_device: None,
            select_new_device: true,
            watch_volume: false,
            mime_type: None,
            image_mime_type: "image/jpeg".into(),
            image_quality: 0.9,
        }
    }
}
