use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of capture input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Platform name for an input device of this kind.
    pub fn input_name(self) -> &'static str {
        match self {
            Self::Video => "videoinput",
            Self::Audio => "audioinput",
        }
    }

    /// Permission name guarding this kind.
    pub fn permission_name(self) -> &'static str {
        match self {
            Self::Video => "camera",
            Self::Audio => "microphone",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.input_name())
    }
}

/// A capture input exposed by the platform.
///
/// Identity is `id`. `label` may be empty until permission is granted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub group_id: String,
    pub kind: MediaKind,
    pub label: String,
}

impl Device {
    pub fn new(id: &str, group_id: &str, kind: MediaKind, label: &str) -> Self {
        Self {
            id: id.to_string(),
            group_id: group_id.to_string(),
            kind,
            label: label.to_string(),
        }
    }

    pub fn video(id: &str, label: &str) -> Self {
        Self::new(id, id, MediaKind::Video, label)
    }

    pub fn audio(id: &str, label: &str) -> Self {
        Self::new(id, id, MediaKind::Audio, label)
    }
}

/// Permission state reported by the platform for one media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

/// Width and height of a video frame in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}
