use std::sync::Arc;

use qrscan_types::CodeFormat;

use crate::detector::{BoundingBox, CodeDetector, DetectedCode, DetectorProvider};
use crate::error::DetectorError;
use crate::frame::Frame;

/// QR detection backed by the `rqrr` decoder
pub struct RqrrProvider;

impl DetectorProvider for RqrrProvider {
    fn supported_formats(&self) -> Vec<CodeFormat> {
        vec![CodeFormat::QrCode]
    }

    fn create(&self, formats: &[CodeFormat]) -> Result<Arc<dyn CodeDetector>, DetectorError> {
        match formats {
            [CodeFormat::QrCode] => Ok(Arc::new(RqrrDetector)),
            other => Err(DetectorError::UnsupportedFormat(
                other
                    .iter()
                    .map(|f| f.detector_name())
                    .collect::<Vec<_>>()
                    .join(","),
            )),
        }
    }
}

pub struct RqrrDetector;

#[async_trait::async_trait]
impl CodeDetector for RqrrDetector {
    async fn detect(&self, frame: Arc<Frame>) -> Result<Vec<DetectedCode>, DetectorError> {
        tokio::task::spawn_blocking(move || detect_sync(&frame))
            .await
            .map_err(|e| DetectorError::Worker(e.to_string()))?
    }
}

fn detect_sync(frame: &Frame) -> Result<Vec<DetectedCode>, DetectorError> {
    let luma = frame.image().to_luma8();
    let (width, height) = luma.dimensions();

    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            luma.get_pixel(x as u32, y as u32)[0]
        });

    let mut codes = Vec::new();
    let mut last_error = None;

    for grid in prepared.detect_grids() {
        let bounds = bounding_box(&grid.bounds);
        match grid.decode() {
            Ok((_meta, content)) => codes.push(DetectedCode {
                raw_value: content,
                format: CodeFormat::QrCode,
                bounds: Some(bounds),
            }),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    // A grid was found but nothing decoded: report it so callers can log the noise
    if codes.is_empty()
        && let Some(e) = last_error
    {
        return Err(DetectorError::Decode(e));
    }

    Ok(codes)
}

fn bounding_box(corners: &[rqrr::Point; 4]) -> BoundingBox {
    let min_x = corners.iter().map(|p| p.x).min().unwrap_or(0);
    let max_x = corners.iter().map(|p| p.x).max().unwrap_or(0);
    let min_y = corners.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = corners.iter().map(|p| p.y).max().unwrap_or(0);

    BoundingBox {
        x: min_x,
        y: min_y,
        width: (max_x - min_x).max(0) as u32,
        height: (max_y - min_y).max(0) as u32,
    }
}
