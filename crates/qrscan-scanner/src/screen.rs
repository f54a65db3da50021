use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, RgbaImage};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use xcap::Monitor;

use crate::camera::{Camera, FeedTrack, TrackSettings, VideoConstraints, VideoStream};
use crate::error::AcquireError;
use crate::frame::Frame;

/// Samples the primary monitor, for codes shown on screen
pub struct ScreenCamera {
    fps: u32,
}

impl ScreenCamera {
    pub fn new(fps: u32) -> Self {
        Self { fps: fps.max(1) }
    }
}

#[async_trait::async_trait]
impl Camera for ScreenCamera {
    async fn open(&self, constraints: &VideoConstraints) -> Result<VideoStream, AcquireError> {
        let (width, height) = tokio::task::spawn_blocking(|| {
            let monitors = Monitor::all()
                .map_err(|e| AcquireError::Device(format!("failed to get monitors: {e}")))?;
            let monitor = monitors
                .first()
                .ok_or_else(|| AcquireError::Device("no monitor found".to_string()))?;
            Ok::<_, AcquireError>((monitor.width(), monitor.height()))
        })
        .await
        .map_err(|e| AcquireError::Device(format!("screen probe failed: {e}")))??;

        let settings = TrackSettings {
            facing: constraints.facing,
            width: width.min(constraints.ideal_width),
            height: height.min(constraints.ideal_height),
        };
        tracing::info!("Opened screen camera ({}x{})", width, height);

        let track = Arc::new(FeedTrack::new("screen:primary", settings));
        let (tx, rx) = watch::channel(None);
        let period = Duration::from_millis(1000 / u64::from(self.fps));
        tokio::spawn(feed_screen(*constraints, period, tx, track.stopped()));

        Ok(VideoStream::new(vec![track], rx))
    }
}

fn capture_primary(max_w: u32, max_h: u32) -> Result<DynamicImage, AcquireError> {
    let monitors =
        Monitor::all().map_err(|e| AcquireError::Device(format!("failed to get monitors: {e}")))?;
    let monitor = monitors
        .first()
        .ok_or_else(|| AcquireError::Device("no monitor found".to_string()))?;
    let captured = monitor
        .capture_image()
        .map_err(|e| AcquireError::Device(format!("failed to capture screen: {e}")))?;

    let (w, h) = (captured.width(), captured.height());
    let image = RgbaImage::from_raw(w, h, captured.into_raw())
        .ok_or_else(|| AcquireError::Device("malformed screen capture".to_string()))?;

    Ok(DynamicImage::ImageRgba8(image).resize(max_w, max_h, image::imageops::FilterType::Triangle))
}

async fn feed_screen(
    constraints: VideoConstraints,
    period: Duration,
    tx: watch::Sender<Option<Arc<Frame>>>,
    stopped: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = stopped.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let (max_w, max_h) = (constraints.ideal_width, constraints.ideal_height);
        match tokio::task::spawn_blocking(move || capture_primary(max_w, max_h)).await {
            Ok(Ok(image)) => {
                if tx.send(Some(Arc::new(Frame::new(image)))).is_err() {
                    break;
                }
            }
            Ok(Err(e)) => tracing::warn!("Screen capture failed: {e}"),
            Err(e) => tracing::error!("Screen capture task error: {e}"),
        }
    }

    tracing::debug!("Screen feed stopped");
}
