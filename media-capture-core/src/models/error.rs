use thiserror::Error;

/// Errors that can occur while acquiring, recording or snapshotting media.
///
/// The first four variants are the denied-class conditions: any of them
/// puts the session into `CaptureStatus::Denied` and is recovered through
/// event-triggered reacquisition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("no device matches the requested media")]
    NoMatchingDevice,

    #[error("device fault: {0}")]
    DeviceFault(String),

    #[error("device enumeration failed: {0}")]
    EnumerationFailure(String),

    #[error("recorder failed: {0}")]
    RecorderFailed(String),

    #[error("snapshot failed: {0}")]
    SnapshotFailed(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}

impl CaptureError {
    /// Whether this error moves the session into the denied state.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::NoMatchingDevice
                | Self::DeviceFault(_)
                | Self::EnumerationFailure(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_class() {
        assert!(CaptureError::PermissionDenied.is_denial());
        assert!(CaptureError::NoMatchingDevice.is_denial());
        assert!(CaptureError::DeviceFault("usb reset".into()).is_denial());
        assert!(CaptureError::EnumerationFailure("gone".into()).is_denial());
        assert!(!CaptureError::SnapshotFailed("encoder".into()).is_denial());
        assert!(!CaptureError::RecorderFailed("codec".into()).is_denial());
    }

    #[test]
    fn messages_carry_detail() {
        let err = CaptureError::DeviceFault("could not start video source".into());
        assert_eq!(err.to_string(), "device fault: could not start video source");
    }
}
