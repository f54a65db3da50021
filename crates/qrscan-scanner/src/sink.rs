use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::camera::VideoStream;
use crate::error::SinkError;
use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
}

#[derive(Default)]
struct SinkInner {
    source: Option<watch::Receiver<Option<Arc<Frame>>>>,
    metadata: Option<VideoMetadata>,
    playing: bool,
}

/// Where a stream is played. Detection reads frames from here, never from the camera.
#[derive(Default)]
pub struct VideoSink {
    inner: Mutex<SinkInner>,
}

impl VideoSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SinkInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Bind a stream, replacing any previous one. Playback stays paused.
    pub fn attach(&self, stream: &VideoStream) {
        let mut inner = self.lock();
        inner.source = Some(stream.frames());
        inner.metadata = None;
        inner.playing = false;
    }

    /// Resolves once the first frame has arrived and its dimensions are known
    pub async fn ready(&self) -> Result<VideoMetadata, SinkError> {
        let mut source = self.lock().source.clone().ok_or(SinkError::NoSource)?;

        let metadata = {
            let frame = source
                .wait_for(|frame| frame.is_some())
                .await
                .map_err(|_| SinkError::SourceEnded)?;
            frame.as_ref().map(|f| VideoMetadata {
                width: f.width(),
                height: f.height(),
            })
        };
        let metadata = metadata.ok_or(SinkError::NotReady)?;

        let mut inner = self.lock();
        if inner.source.is_none() {
            return Err(SinkError::NoSource);
        }
        inner.metadata = Some(metadata);
        Ok(metadata)
    }

    pub fn play(&self) -> Result<(), SinkError> {
        let mut inner = self.lock();
        if inner.source.is_none() {
            return Err(SinkError::NoSource);
        }
        if inner.metadata.is_none() {
            return Err(SinkError::NotReady);
        }
        inner.playing = true;
        Ok(())
    }

    pub fn pause(&self) {
        self.lock().playing = false;
    }

    /// Playing means: started, still attached, and the stream has not ended
    pub fn is_playing(&self) -> bool {
        let inner = self.lock();
        match &inner.source {
            Some(source) if inner.playing => source.has_changed().is_ok(),
            _ => false,
        }
    }

    pub fn current_frame(&self) -> Option<Arc<Frame>> {
        let inner = self.lock();
        let source = inner.source.as_ref()?;
        source.borrow().clone()
    }

    pub fn detach(&self) {
        let mut inner = self.lock();
        inner.source = None;
        inner.metadata = None;
        inner.playing = false;
    }
}
