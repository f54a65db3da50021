use qrscan_types::{ScanFailure, ScanFailureKind};

/// Startup failures of a scanner session. The display text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("This device can't read QR codes: no code detector is available on this platform.")]
    UnsupportedPlatform,

    #[error("Camera permission denied. Please allow camera access in your settings.")]
    PermissionDenied,

    #[error("Could not access the camera: {0}")]
    DeviceError(String),
}

impl ScanError {
    pub fn kind(&self) -> ScanFailureKind {
        match self {
            ScanError::UnsupportedPlatform => ScanFailureKind::UnsupportedPlatform,
            ScanError::PermissionDenied => ScanFailureKind::PermissionDenied,
            ScanError::DeviceError(_) => ScanFailureKind::DeviceError,
        }
    }

    pub fn to_failure(&self) -> ScanFailure {
        ScanFailure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Camera acquisition failures reported by a [`crate::Camera`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    #[error("camera access denied")]
    PermissionDenied,

    #[error("{0}")]
    Device(String),
}

impl From<AcquireError> for ScanError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::PermissionDenied => ScanError::PermissionDenied,
            AcquireError::Device(detail) => ScanError::DeviceError(detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("no stream is attached to the video sink")]
    NoSource,

    #[error("video stream ended before it was ready")]
    SourceEnded,

    #[error("video sink has no metadata yet")]
    NotReady,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectorError {
    #[error("unsupported symbology: {0}")]
    UnsupportedFormat(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("detector worker failed: {0}")]
    Worker(String),
}
