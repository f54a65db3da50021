use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use image::imageops::FilterType;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::camera::{Camera, FeedTrack, TrackSettings, VideoConstraints, VideoStream};
use crate::error::AcquireError;
use crate::frame::Frame;

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// A directory of still images replayed in a loop as if it were a camera
pub struct FrameDirCamera {
    dir: PathBuf,
    fps: u32,
}

impl FrameDirCamera {
    pub fn new(dir: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            dir: dir.into(),
            fps: fps.max(1),
        }
    }
}

#[async_trait::async_trait]
impl Camera for FrameDirCamera {
    async fn open(&self, constraints: &VideoConstraints) -> Result<VideoStream, AcquireError> {
        let dir = self.dir.clone();
        let (max_w, max_h) = (constraints.ideal_width, constraints.ideal_height);

        let frames = tokio::task::spawn_blocking(move || load_frames(&dir, max_w, max_h))
            .await
            .map_err(|e| AcquireError::Device(format!("frame loader failed: {e}")))??;

        // Negotiated size is whatever the first frame ended up as
        let settings = TrackSettings {
            facing: constraints.facing,
            width: frames[0].width(),
            height: frames[0].height(),
        };
        tracing::info!(
            "Opened frame camera {} ({} frames, {}x{})",
            self.dir.display(),
            frames.len(),
            settings.width,
            settings.height
        );

        let track = Arc::new(FeedTrack::new(
            format!("frames:{}", self.dir.display()),
            settings,
        ));
        let (tx, rx) = watch::channel(None);
        let period = Duration::from_millis(1000 / u64::from(self.fps));
        tokio::spawn(feed_frames(frames, period, tx, track.stopped()));

        Ok(VideoStream::new(vec![track], rx))
    }
}

fn load_frames(dir: &Path, max_w: u32, max_h: u32) -> Result<Vec<Arc<Frame>>, AcquireError> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => AcquireError::PermissionDenied,
        _ => AcquireError::Device(format!("cannot open {}: {e}", dir.display())),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();

    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        match image::open(&path) {
            Ok(image) => frames.push(Arc::new(Frame::new(fit_within(image, max_w, max_h)))),
            Err(image::ImageError::IoError(e)) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(AcquireError::PermissionDenied);
            }
            Err(e) => tracing::warn!("Skipping unreadable frame {}: {e}", path.display()),
        }
    }

    if frames.is_empty() {
        return Err(AcquireError::Device(format!(
            "no video frames found in {}",
            dir.display()
        )));
    }

    Ok(frames)
}

/// Downscale anything larger than the ideal size, keeping the aspect ratio
fn fit_within(image: DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    if image.width() <= max_w && image.height() <= max_h {
        image
    } else {
        image.resize(max_w, max_h, FilterType::Triangle)
    }
}

async fn feed_frames(
    frames: Vec<Arc<Frame>>,
    period: Duration,
    tx: watch::Sender<Option<Arc<Frame>>>,
    stopped: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for frame in frames.iter().cycle() {
        tokio::select! {
            _ = stopped.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if tx.send(Some(frame.clone())).is_err() {
            // Nobody holds the stream anymore
            break;
        }
    }

    tracing::debug!("Frame feed stopped");
}
