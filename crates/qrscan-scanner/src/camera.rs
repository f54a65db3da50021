use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::AcquireError;
use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    /// Rear camera, pointing away from the user
    #[default]
    Environment,
    User,
}

/// What the session asks the camera for. Ideal values are preferences, not requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// What the device actually negotiated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSettings {
    pub facing: FacingMode,
    pub width: u32,
    pub height: u32,
}

pub trait VideoTrack: Send + Sync {
    fn label(&self) -> &str;

    fn settings(&self) -> TrackSettings;

    /// Release the underlying device. Must be safe to call more than once.
    fn stop(&self);

    fn is_live(&self) -> bool;
}

/// Video device access
#[async_trait::async_trait]
pub trait Camera: Send + Sync {
    async fn open(&self, constraints: &VideoConstraints) -> Result<VideoStream, AcquireError>;
}

/// Live camera stream: its tracks plus the latest frame
pub struct VideoStream {
    tracks: Vec<Arc<dyn VideoTrack>>,
    frames: watch::Receiver<Option<Arc<Frame>>>,
}

impl VideoStream {
    pub fn new(
        tracks: Vec<Arc<dyn VideoTrack>>,
        frames: watch::Receiver<Option<Arc<Frame>>>,
    ) -> Self {
        Self { tracks, frames }
    }

    pub fn tracks(&self) -> &[Arc<dyn VideoTrack>] {
        &self.tracks
    }

    pub fn frames(&self) -> watch::Receiver<Option<Arc<Frame>>> {
        self.frames.clone()
    }

    pub fn stop_tracks(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

/// Track backed by a producer task that watches a cancellation token
pub struct FeedTrack {
    label: String,
    settings: TrackSettings,
    stopped: CancellationToken,
}

impl FeedTrack {
    pub fn new(label: impl Into<String>, settings: TrackSettings) -> Self {
        Self {
            label: label.into(),
            settings,
            stopped: CancellationToken::new(),
        }
    }

    /// Token cancelled once the track is stopped
    pub fn stopped(&self) -> CancellationToken {
        self.stopped.clone()
    }
}

impl VideoTrack for FeedTrack {
    fn label(&self) -> &str {
        &self.label
    }

    fn settings(&self) -> TrackSettings {
        self.settings
    }

    fn stop(&self) {
        if !self.stopped.is_cancelled() {
            tracing::debug!("Stopping video track '{}'", self.label);
            self.stopped.cancel();
        }
    }

    fn is_live(&self) -> bool {
        !self.stopped.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_tracks_stops_every_track() {
        let settings = TrackSettings {
            facing: FacingMode::Environment,
            width: 640,
            height: 480,
        };
        let a = Arc::new(FeedTrack::new("a", settings));
        let b = Arc::new(FeedTrack::new("b", settings));
        let (_tx, rx) = watch::channel(None);
        let stream = VideoStream::new(vec![a.clone(), b.clone()], rx);

        stream.stop_tracks();
        stream.stop_tracks();

        assert!(!a.is_live());
        assert!(!b.is_live());
        assert!(a.stopped().is_cancelled());
    }
}
