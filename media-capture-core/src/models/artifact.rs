use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::device::FrameSize;

/// Binary media data plus its MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Blob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex SHA-256 of the bytes.
    pub fn checksum(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Which captured slot an artifact occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Image,
    Video,
    Audio,
}

/// Descriptive data for a captured artifact.
///
/// Serializable so the host can persist it next to the blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    pub id: String,
    pub kind: ArtifactKind,
    pub mime_type: String,
    pub size_bytes: u64,
    pub checksum: String,
    pub created_at: String,
    pub duration_secs: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub chunk_count: usize,
    pub device_id: Option<String>,
}

/// The finalized output of one recording or snapshot cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedMedia {
    pub kind: ArtifactKind,
    pub blob: Blob,
    pub metadata: ArtifactMetadata,
}

impl CapturedMedia {
    /// An image produced by `snap()`.
    pub fn image(blob: Blob, size: FrameSize, device_id: Option<String>) -> Self {
        Self::build(ArtifactKind::Image, blob, 0.0, Some(size), 0, device_id)
    }

    /// A video or audio recording assembled from `chunk_count` chunks.
    pub fn recording(
        kind: ArtifactKind,
        blob: Blob,
        duration_secs: f64,
        size: Option<FrameSize>,
        chunk_count: usize,
        device_id: Option<String>,
    ) -> Self {
        Self::build(kind, blob, duration_secs, size, chunk_count, device_id)
    }

    fn build(
        kind: ArtifactKind,
        blob: Blob,
        duration_secs: f64,
        size: Option<FrameSize>,
        chunk_count: usize,
        device_id: Option<String>,
    ) -> Self {
        let metadata = ArtifactMetadata {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            mime_type: blob.mime_type.clone(),
            size_bytes: blob.len() as u64,
            checksum: blob.checksum(),
            created_at: chrono::Utc::now().to_rfc3339(),
            duration_secs,
            width: size.map(|s| s.width),
            height: size.map(|s| s.height),
            chunk_count,
            device_id,
        };
        Self {
            kind,
            blob,
            metadata,
        }
    }

    pub fn metadata_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_sha256_hex() {
        let blob = Blob::new(b"abc".to_vec(), "text/plain");
        assert_eq!(
            blob.checksum(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn image_metadata_carries_dimensions() {
        let blob = Blob::new(vec![1, 2, 3, 4], "image/jpeg");
        let image = CapturedMedia::image(blob, FrameSize::new(640, 480), Some("cam".into()));

        assert_eq!(image.kind, ArtifactKind::Image);
        assert_eq!(image.metadata.width, Some(640));
        assert_eq!(image.metadata.height, Some(480));
        assert_eq!(image.metadata.size_bytes, 4);
        assert_eq!(image.metadata.mime_type, "image/jpeg");
        assert!(uuid::Uuid::parse_str(&image.metadata.id).is_ok());
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let blob = Blob::new(vec![0; 8], "audio/webm");
        let audio = CapturedMedia::recording(ArtifactKind::Audio, blob, 1.5, None, 2, None);
        let json = audio.metadata_json().unwrap();

        assert!(json.contains("\"chunkCount\": 2"));
        assert!(json.contains("\"kind\": \"audio\""));
        assert!(json.contains("\"durationSecs\": 1.5"));

        let parsed: ArtifactMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, audio.metadata);
    }
}
