use std::sync::Arc;

use qrscan_types::CodeFormat;

use crate::error::DetectorError;
use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCode {
    pub raw_value: String,
    pub format: CodeFormat,
    pub bounds: Option<BoundingBox>,
}

impl DetectedCode {
    pub fn qr(raw_value: impl Into<String>) -> Self {
        Self {
            raw_value: raw_value.into(),
            format: CodeFormat::QrCode,
            bounds: None,
        }
    }
}

/// Platform code-detection capability
pub trait DetectorProvider: Send + Sync {
    /// Symbologies this platform can recognise
    fn supported_formats(&self) -> Vec<CodeFormat>;

    /// Build a detector scoped to exactly `formats`
    fn create(&self, formats: &[CodeFormat]) -> Result<Arc<dyn CodeDetector>, DetectorError>;
}

#[async_trait::async_trait]
pub trait CodeDetector: Send + Sync {
    /// Zero or more codes found in `frame`, in detection order
    async fn detect(&self, frame: Arc<Frame>) -> Result<Vec<DetectedCode>, DetectorError>;
}
