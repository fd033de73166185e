//! `data:` URI encoding and decoding.
//!
//! Snapshot export falls back to a data URI when the surface cannot hand
//! out a blob directly. Decoding here turns that URI back into the same
//! [`Blob`] shape.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::percent_decode_str;

use crate::models::artifact::Blob;
use crate::models::error::CaptureError;

const DEFAULT_MIME: &str = "text/plain";

/// Encode a blob as a base64 `data:` URI.
pub fn encode_data_uri(blob: &Blob) -> String {
    format!("data:{};base64,{}", blob.mime_type, STANDARD.encode(&blob.bytes))
}

/// Decode a `data:` URI (base64 or percent-encoded) into a blob.
pub fn decode_data_uri(uri: &str) -> Result<Blob, CaptureError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CaptureError::SnapshotFailed("not a data URI".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CaptureError::SnapshotFailed("data URI has no payload".into()))?;

    let (meta, is_base64) = match meta.strip_suffix(";base64") {
        Some(stripped) => (stripped, true),
        None => (meta, false),
    };

    // Parameters such as `charset` are dropped; the blob only keeps the type.
    let mime_type = meta
        .split(';')
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MIME);

    let bytes = if is_base64 {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| CaptureError::SnapshotFailed(format!("invalid base64 payload: {}", e)))?
    } else {
        percent_decode(payload)?
    };

    Ok(Blob::new(bytes, mime_type))
}

/// Percent-decode a payload. `percent_decode_str` passes bad escapes
/// through untouched, so they are rejected up front.
fn percent_decode(input: &str) -> Result<Vec<u8>, CaptureError> {
    let malformed = input.split('%').skip(1).any(|escape| {
        let hex = escape.as_bytes();
        hex.len() < 2 || !hex[..2].iter().all(u8::is_ascii_hexdigit)
    });
    if malformed {
        return Err(CaptureError::SnapshotFailed("invalid percent escape".into()));
    }
    Ok(percent_decode_str(input).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_roundtrip_keeps_type() {
        let blob = Blob::new(vec![0xff, 0xd8, 0xff, 0xe0, 0x00], "image/jpeg");
        let uri = encode_data_uri(&blob);
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), blob);
    }

    #[test]
    fn percent_encoded_payload() {
        let blob = decode_data_uri("data:text/plain;charset=utf-8,hello%20world").unwrap();
        assert_eq!(blob.bytes, b"hello world");
        assert_eq!(blob.mime_type, "text/plain");
    }

    #[test]
    fn percent_escapes_decode_to_raw_bytes() {
        let blob = decode_data_uri("data:application/octet-stream,%00%FFa%2Cb").unwrap();
        assert_eq!(blob.bytes, vec![0x00, 0xff, b'a', b',', b'b']);
    }

    #[test]
    fn missing_type_defaults_to_text() {
        let blob = decode_data_uri("data:,abc").unwrap();
        assert_eq!(blob.mime_type, "text/plain");
        assert_eq!(blob.bytes, b"abc");
    }

    #[test]
    fn rejects_malformed() {
        assert!(decode_data_uri("http://example.com/a.png").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png;base64,***").is_err());
        assert!(decode_data_uri("data:text/plain,%zz").is_err());
        assert!(decode_data_uri("data:text/plain,trailing%4").is_err());
    }
}
