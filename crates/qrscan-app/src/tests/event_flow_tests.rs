//! Event loop driven end to end over kanal channels, with fake platform capabilities

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::DynamicImage;
use kanal::{AsyncReceiver, AsyncSender};
use qrscan_config::Config;
use qrscan_core::{HISTORY_STORAGE_KEY, MemoryStorage, Storage};
use qrscan_io::{ClipboardError, ClipboardWriter, LinkError, LinkOpener};
use qrscan_scanner::{
    AcquireError, Camera, CodeDetector, DetectedCode, DetectorError, DetectorProvider,
    FacingMode, FeedTrack, Frame, IntervalClock, ScannerBackend, TrackSettings,
    VideoConstraints, VideoSink, VideoStream, VideoTrack,
};
use qrscan_types::{
    AppEvent, CodeFormat, ResultKind, ScanFailureKind, ScanResult, Screen, UiEvent, ViewSnapshot,
};
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::state::AppState;

/// Camera whose feed always shows the same still frame
struct StillCamera {
    frames: watch::Sender<Option<Arc<Frame>>>,
    tracks: Mutex<Vec<Arc<FeedTrack>>>,
}

impl StillCamera {
    fn new() -> Arc<Self> {
        let frame = Arc::new(Frame::new(DynamicImage::new_luma8(8, 8)));
        let (frames, _) = watch::channel(Some(frame));
        Arc::new(Self {
            frames,
            tracks: Mutex::new(Vec::new()),
        })
    }

    fn opened(&self) -> usize {
        self.tracks.lock().unwrap().len()
    }

    fn all_released(&self) -> bool {
        self.tracks.lock().unwrap().iter().all(|t| !t.is_live())
    }
}

#[async_trait::async_trait]
impl Camera for StillCamera {
    async fn open(&self, constraints: &VideoConstraints) -> Result<VideoStream, AcquireError> {
        let track = Arc::new(FeedTrack::new(
            "still",
            TrackSettings {
                facing: FacingMode::Environment,
                width: constraints.ideal_width,
                height: constraints.ideal_height,
            },
        ));
        self.tracks.lock().unwrap().push(track.clone());
        Ok(VideoStream::new(vec![track], self.frames.subscribe()))
    }
}

/// Finds `payload` on the given attempt, nothing before it
struct DelayedDetector {
    payload: Option<String>,
    found_on: usize,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl CodeDetector for DelayedDetector {
    async fn detect(&self, _frame: Arc<Frame>) -> Result<Vec<DetectedCode>, DetectorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.payload {
            Some(payload) if call >= self.found_on => Ok(vec![DetectedCode::qr(payload.clone())]),
            _ => Ok(Vec::new()),
        }
    }
}

struct FakeDetectors {
    detector: Arc<DelayedDetector>,
}

impl FakeDetectors {
    fn finding(payload: &str, found_on: usize) -> Arc<Self> {
        Self::with(Some(payload.to_string()), found_on)
    }

    fn never() -> Arc<Self> {
        Self::with(None, 0)
    }

    fn with(payload: Option<String>, found_on: usize) -> Arc<Self> {
        Arc::new(Self {
            detector: Arc::new(DelayedDetector {
                payload,
                found_on,
                calls: AtomicUsize::new(0),
            }),
        })
    }
}

impl DetectorProvider for FakeDetectors {
    fn supported_formats(&self) -> Vec<CodeFormat> {
        vec![CodeFormat::QrCode]
    }

    fn create(&self, _formats: &[CodeFormat]) -> Result<Arc<dyn CodeDetector>, DetectorError> {
        Ok(self.detector.clone())
    }
}

#[derive(Default)]
struct RecordingClipboard {
    copied: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ClipboardWriter for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl LinkOpener for RecordingOpener {
    async fn open(&self, url: &str) -> Result<(), LinkError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

struct Harness {
    to_app: AsyncSender<AppEvent>,
    to_ui: AsyncReceiver<AppEvent>,
    storage: Arc<MemoryStorage>,
    camera: Arc<StillCamera>,
    clipboard: Arc<RecordingClipboard>,
    opener: Arc<RecordingOpener>,
    cancel: CancellationToken,
    handle: JoinHandle<anyhow::Result<()>>,
}

fn spawn_app(detectors: Option<Arc<FakeDetectors>>, storage: MemoryStorage) -> Harness {
    let storage = Arc::new(storage);
    let camera = StillCamera::new();
    let clipboard = Arc::new(RecordingClipboard::default());
    let opener = Arc::new(RecordingOpener::default());

    let scanner = ScannerBackend {
        camera: camera.clone(),
        detectors: detectors.map(|d| d as Arc<dyn DetectorProvider>),
        sink: Arc::new(VideoSink::new()),
        clock: Arc::new(IntervalClock::from_millis(1)),
        constraints: VideoConstraints::default(),
    };

    let state = Arc::new(AppState {
        config: Arc::new(RwLock::new(Config::default())),
        storage: storage.clone(),
        scanner,
        clipboard: clipboard.clone(),
        links: opener.clone(),
    });

    let (to_app, from_ui) = kanal::bounded_async(64);
    let (to_ui_tx, to_ui) = kanal::bounded_async(256);
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(event_loop(
        state,
        from_ui,
        to_app.clone(),
        to_ui_tx,
        cancel.clone(),
    ));

    Harness {
        to_app,
        to_ui,
        storage,
        camera,
        clipboard,
        opener,
        cancel,
        handle,
    }
}

impl Harness {
    async fn send(&self, event: UiEvent) {
        self.to_app.send(AppEvent::UiEvent(event)).await.unwrap();
    }

    /// Next render matching `pred`, skipping the ones in between
    async fn render_where(&self, pred: impl Fn(&ViewSnapshot) -> bool) -> ViewSnapshot {
        timeout(Duration::from_secs(3), async {
            loop {
                match self.to_ui.recv().await {
                    Ok(AppEvent::Render(snapshot)) if pred(&snapshot) => return snapshot,
                    Ok(_) => continue,
                    Err(e) => panic!("Channel error: {}", e),
                }
            }
        })
        .await
        .expect("Timeout - expected render never arrived!")
    }

    async fn shutdown_event(&self) {
        let result = timeout(Duration::from_secs(3), async {
            loop {
                if let Ok(AppEvent::Shutdown) = self.to_ui.recv().await {
                    return;
                }
            }
        })
        .await;
        assert!(result.is_ok(), "Timeout waiting for shutdown!");
    }
}

#[tokio::test]
async fn test_scan_flow_records_link() {
    let app = spawn_app(Some(FakeDetectors::finding("https://example.com", 3)), MemoryStorage::new());

    let home = app.render_where(|_| true).await;
    assert_eq!(home.screen, Screen::Home);

    app.send(UiEvent::StartScan).await;
    let result = app.render_where(|s| s.screen == Screen::Result).await;

    let current = result.current.expect("result screen shows the scan");
    assert_eq!(current.text, "https://example.com");
    assert_eq!(current.kind, ResultKind::Link);
    assert_eq!(result.history.len(), 1);
    assert_eq!(result.history[0].kind, ResultKind::Link);

    let stored = app.storage.get(HISTORY_STORAGE_KEY).unwrap().unwrap();
    let log: Vec<ScanResult> = serde_json::from_str(&stored).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].text, "https://example.com");

    assert_eq!(app.camera.opened(), 1);
    assert!(app.camera.all_released());

    app.send(UiEvent::OpenResult).await;
    timeout(Duration::from_secs(2), async {
        while app.opener.opened.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("link was never opened");
    assert_eq!(app.opener.opened.lock().unwrap()[0], "https://example.com");

    app.send(UiEvent::Quit).await;
    app.shutdown_event().await;
    assert!(app.handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_missing_detector_shows_error_then_dismisses() {
    let app = spawn_app(None, MemoryStorage::new());
    app.render_where(|s| s.screen == Screen::Home).await;

    app.send(UiEvent::StartScan).await;
    let failed = app.render_where(|s| s.scanner.error.is_some()).await;
    assert_eq!(failed.screen, Screen::Scanning);
    assert!(!failed.scanner.loading);
    assert_eq!(
        failed.scanner.error.map(|f| f.kind),
        Some(ScanFailureKind::UnsupportedPlatform)
    );
    assert_eq!(app.camera.opened(), 0);

    app.send(UiEvent::CloseScanner).await;
    let home = app.render_where(|s| s.screen == Screen::Home).await;
    assert!(home.scanner.error.is_none());
    assert!(home.history.is_empty());

    app.cancel.cancel();
    app.shutdown_event().await;
}

#[tokio::test]
async fn test_cancel_mid_scan_releases_camera() {
    let app = spawn_app(Some(FakeDetectors::never()), MemoryStorage::new());
    app.render_where(|s| s.screen == Screen::Home).await;

    app.send(UiEvent::StartScan).await;
    app.render_where(|s| s.screen == Screen::Scanning && !s.scanner.loading)
        .await;
    assert!(!app.camera.all_released());

    app.send(UiEvent::CloseScanner).await;
    let home = app.render_where(|s| s.screen == Screen::Home).await;

    assert!(home.history.is_empty());
    assert!(app.camera.all_released());
    assert!(app.storage.get(HISTORY_STORAGE_KEY).unwrap().is_none());

    app.cancel.cancel();
    app.shutdown_event().await;
}

#[tokio::test]
async fn test_copy_from_history_shows_toast() {
    let storage = MemoryStorage::new();
    let seeded = vec![ScanResult::new("plain words", 1_700_000_000_000)];
    storage
        .set(HISTORY_STORAGE_KEY, &serde_json::to_string(&seeded).unwrap())
        .unwrap();

    let app = spawn_app(Some(FakeDetectors::never()), storage);
    let home = app.render_where(|_| true).await;
    assert_eq!(home.history.len(), 1);

    app.send(UiEvent::ShowHistory).await;
    app.send(UiEvent::SelectHistory(0)).await;
    let result = app.render_where(|s| s.screen == Screen::Result).await;
    assert_eq!(result.current.map(|c| c.kind), Some(ResultKind::Text));

    app.send(UiEvent::CopyResult).await;
    let toast = app.render_where(|s| s.toast.is_some()).await;
    assert_eq!(toast.toast.as_deref(), Some("Copied to clipboard!"));
    assert_eq!(*app.clipboard.copied.lock().unwrap(), vec!["plain words".to_string()]);

    // Scanning history entries never touches the camera
    assert_eq!(app.camera.opened(), 0);

    app.cancel.cancel();
    app.shutdown_event().await;
}
