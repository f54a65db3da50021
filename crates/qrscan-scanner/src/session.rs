use std::sync::{Arc, Mutex, MutexGuard};

use qrscan_types::CodeFormat;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::camera::{Camera, VideoConstraints, VideoStream};
use crate::detector::{CodeDetector, DetectorProvider};
use crate::error::ScanError;
use crate::frame::{FrameClock, FrameTicker};
use crate::sink::VideoSink;

/// Symbology every session is scoped to
const SCAN_FORMAT: CodeFormat = CodeFormat::QrCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Acquiring,
    Active,
    Error(ScanError),
    Stopped,
}

/// Platform capabilities a session is built from
#[derive(Clone)]
pub struct ScannerBackend {
    pub camera: Arc<dyn Camera>,
    /// `None` when the platform has no code detector at all
    pub detectors: Option<Arc<dyn DetectorProvider>>,
    pub sink: Arc<VideoSink>,
    pub clock: Arc<dyn FrameClock>,
    pub constraints: VideoConstraints,
}

/// The eventual outcome of a started session
pub struct PendingScan {
    rx: oneshot::Receiver<String>,
}

impl PendingScan {
    fn closed() -> Self {
        let (_, rx) = oneshot::channel();
        Self { rx }
    }

    /// The decoded value, or `None` if the session stopped without one
    pub async fn decoded(self) -> Option<String> {
        self.rx.await.ok()
    }

    /// Non-blocking check, `None` while still scanning or after a stop
    pub fn try_take(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

#[derive(Default)]
struct Resources {
    stream: Option<VideoStream>,
    sink_bound: bool,
    frame_loop: Option<JoinHandle<()>>,
    report: Option<oneshot::Sender<String>>,
}

struct Shared {
    state: watch::Sender<SessionState>,
    cancel: CancellationToken,
    sink: Arc<VideoSink>,
    resources: Mutex<Resources>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Resources> {
        self.resources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take ownership of a freshly opened stream and bind it to the sink.
    /// Returns false (after releasing the stream) when the session was stopped meanwhile.
    fn adopt(&self, stream: VideoStream) -> bool {
        let mut res = self.lock();
        if self.cancel.is_cancelled() {
            drop(res);
            tracing::debug!("Session stopped during acquisition, releasing camera");
            stream.stop_tracks();
            return false;
        }

        self.sink.attach(&stream);
        res.sink_bound = true;
        res.stream = Some(stream);
        true
    }

    fn launch(
        self: &Arc<Self>,
        detector: Arc<dyn CodeDetector>,
        ticker: Box<dyn FrameTicker>,
    ) -> bool {
        let mut res = self.lock();
        if self.cancel.is_cancelled() {
            return false;
        }

        res.frame_loop = Some(tokio::spawn(detection_loop(
            Arc::clone(self),
            detector,
            ticker,
        )));
        true
    }

    /// Release the camera and the sink binding. Returns the report slot if still unused.
    fn release(&self) -> Option<oneshot::Sender<String>> {
        let (stream, sink_bound, frame_loop, report) = {
            let mut res = self.lock();
            (
                res.stream.take(),
                std::mem::take(&mut res.sink_bound),
                res.frame_loop.take(),
                res.report.take(),
            )
        };

        if let Some(stream) = stream {
            tracing::debug!("Releasing {} camera track(s)", stream.tracks().len());
            stream.stop_tracks();
        }
        if sink_bound {
            self.sink.detach();
        }
        // The loop observes the cancelled token at its next suspension point
        drop(frame_loop);

        report
    }

    fn stop(&self) -> Option<oneshot::Sender<String>> {
        self.cancel.cancel();
        let report = self.release();

        self.state.send_if_modified(|state| {
            if *state == SessionState::Stopped {
                false
            } else {
                tracing::debug!("Scanner session {:?} -> Stopped", state);
                *state = SessionState::Stopped;
                true
            }
        });

        report
    }

    fn fail(&self, err: ScanError) {
        tracing::warn!("Scanner startup failed: {err}");
        drop(self.release());

        self.state.send_if_modified(|state| {
            if *state == SessionState::Acquiring {
                *state = SessionState::Error(err);
                true
            } else {
                false
            }
        });
    }
}

/// One scanning attempt, from camera acquisition to the first decoded code.
///
/// A session is single-use: once stopped it never restarts, build a new one
/// to scan again. Every exit path (decode, [`ScannerSession::stop`], drop)
/// funnels into the same idempotent teardown.
pub struct ScannerSession {
    backend: ScannerBackend,
    shared: Arc<Shared>,
}

impl ScannerSession {
    pub fn new(backend: ScannerBackend) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        let shared = Arc::new(Shared {
            state,
            cancel: CancellationToken::new(),
            sink: backend.sink.clone(),
            resources: Mutex::new(Resources::default()),
        });

        Self { backend, shared }
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Acquire the camera and start the detection loop.
    ///
    /// Resolves once the session is active (or was stopped while acquiring).
    /// The returned [`PendingScan`] yields the first non-empty decoded value.
    pub async fn start(&self) -> Result<PendingScan, ScanError> {
        let began = self.shared.state.send_if_modified(|state| {
            if *state == SessionState::Idle {
                *state = SessionState::Acquiring;
                true
            } else {
                false
            }
        });
        if !began {
            tracing::warn!("Scanner session already used, ignoring start");
            return Ok(PendingScan::closed());
        }

        let (report_tx, report_rx) = oneshot::channel();
        {
            let mut res = self.shared.lock();
            if self.shared.cancel.is_cancelled() {
                return Ok(PendingScan::closed());
            }
            res.report = Some(report_tx);
        }

        match self.acquire().await {
            Ok(()) => Ok(PendingScan { rx: report_rx }),
            Err(err) => {
                self.shared.fail(err.clone());
                Err(err)
            }
        }
    }

    async fn acquire(&self) -> Result<(), ScanError> {
        let backend = &self.backend;
        let cancel = &self.shared.cancel;

        // 1. Detector capability
        let provider = match &backend.detectors {
            Some(provider) if provider.supported_formats().contains(&SCAN_FORMAT) => {
                provider.clone()
            }
            _ => return Err(ScanError::UnsupportedPlatform),
        };

        // 2. Camera stream
        tracing::debug!("Requesting camera: {:?}", backend.constraints);
        let stream = backend.camera.open(&backend.constraints).await?;
        if !self.shared.adopt(stream) {
            return Ok(());
        }

        // 3. Sink readiness
        let metadata = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            ready = backend.sink.ready() => {
                ready.map_err(|e| ScanError::DeviceError(e.to_string()))?
            }
        };
        tracing::debug!("Video ready at {}x{}", metadata.width, metadata.height);

        // 4. Playback and detector
        backend
            .sink
            .play()
            .map_err(|e| ScanError::DeviceError(e.to_string()))?;

        let detector = provider.create(&[SCAN_FORMAT]).map_err(|e| {
            tracing::warn!("Detector construction failed: {e}");
            ScanError::UnsupportedPlatform
        })?;

        self.shared.state.send_if_modified(|state| {
            if *state == SessionState::Acquiring {
                *state = SessionState::Active;
                true
            } else {
                false
            }
        });

        if self.shared.launch(detector, backend.clock.ticker()) {
            tracing::info!("Scanner active, looking for {}", SCAN_FORMAT);
        }

        Ok(())
    }

    /// Tear the session down. Safe to call any number of times, from any trigger.
    pub fn stop(&self) {
        drop(self.shared.stop());
    }

    /// Leave the error state
    pub fn dismiss(&self) {
        self.stop();
    }
}

impl Drop for ScannerSession {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn detection_loop(
    shared: Arc<Shared>,
    detector: Arc<dyn CodeDetector>,
    mut ticker: Box<dyn FrameTicker>,
) {
    let cancel = shared.cancel.clone();
    let mut attempts: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if !shared.sink.is_playing() {
            tracing::debug!("Video no longer playing, detection loop exits");
            break;
        }

        let Some(frame) = shared.sink.current_frame() else {
            continue;
        };

        attempts += 1;
        let detected = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            detected = detector.detect(frame) => detected,
        };

        match detected {
            Ok(codes) => {
                let Some(code) = codes.into_iter().next() else {
                    continue;
                };
                if code.raw_value.is_empty() {
                    tracing::trace!("Ignoring code with empty payload");
                    continue;
                }

                tracing::info!("Code decoded after {} attempt(s)", attempts);
                if let Some(b) = code.bounds {
                    tracing::debug!(
                        "{} at {},{} ({}x{})",
                        code.format, b.x, b.y, b.width, b.height
                    );
                }
                if let Some(report) = shared.stop() {
                    let _ = report.send(code.raw_value);
                }
                break;
            }
            Err(e) => {
                // No code in this frame yet
                tracing::trace!("Frame decode failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use image::DynamicImage;
    use tokio::sync::mpsc;

    use super::*;
    use crate::camera::{FacingMode, TrackSettings, VideoTrack};
    use crate::detector::DetectedCode;
    use crate::error::{AcquireError, DetectorError};
    use crate::frame::Frame;

    struct CountingTrack {
        stops: AtomicUsize,
    }

    impl CountingTrack {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                stops: AtomicUsize::new(0),
            })
        }

        fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }
    }

    impl VideoTrack for CountingTrack {
        fn label(&self) -> &str {
            "test"
        }

        fn settings(&self) -> TrackSettings {
            TrackSettings {
                facing: FacingMode::Environment,
                width: 32,
                height: 32,
            }
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn is_live(&self) -> bool {
            self.stops() == 0
        }
    }

    struct FakeCamera {
        outcome: Mutex<Option<Result<VideoStream, AcquireError>>>,
        requested: Mutex<Option<VideoConstraints>>,
    }

    impl FakeCamera {
        fn new(outcome: Result<VideoStream, AcquireError>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(outcome)),
                requested: Mutex::new(None),
            })
        }
    }

    #[async_trait::async_trait]
    impl Camera for FakeCamera {
        async fn open(&self, constraints: &VideoConstraints) -> Result<VideoStream, AcquireError> {
            *self.requested.lock().unwrap() = Some(*constraints);
            self.outcome
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(AcquireError::Device("camera busy".into())))
        }
    }

    type Script = VecDeque<Result<Vec<DetectedCode>, DetectorError>>;

    struct ScriptedDetector {
        script: Mutex<Script>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CodeDetector for ScriptedDetector {
        async fn detect(&self, _frame: Arc<Frame>) -> Result<Vec<DetectedCode>, DetectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    struct ScriptedProvider {
        formats: Vec<CodeFormat>,
        detector: Arc<ScriptedDetector>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<Vec<DetectedCode>, DetectorError>>) -> Arc<Self> {
            Arc::new(Self {
                formats: vec![CodeFormat::QrCode],
                detector: Arc::new(ScriptedDetector {
                    script: Mutex::new(script.into()),
                    calls: AtomicUsize::new(0),
                }),
            })
        }

        fn calls(&self) -> usize {
            self.detector.calls.load(Ordering::SeqCst)
        }
    }

    impl DetectorProvider for ScriptedProvider {
        fn supported_formats(&self) -> Vec<CodeFormat> {
            self.formats.clone()
        }

        fn create(&self, formats: &[CodeFormat]) -> Result<Arc<dyn CodeDetector>, DetectorError> {
            assert_eq!(formats, &[CodeFormat::QrCode]);
            Ok(self.detector.clone())
        }
    }

    /// Ticks only when the test says so
    struct ManualClock {
        ticks: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
    }

    struct ManualTicker {
        rx: mpsc::UnboundedReceiver<()>,
    }

    impl FrameClock for ManualClock {
        fn ticker(&self) -> Box<dyn FrameTicker> {
            let rx = self.ticks.lock().unwrap().take().expect("one ticker per test");
            Box::new(ManualTicker { rx })
        }
    }

    #[async_trait::async_trait]
    impl FrameTicker for ManualTicker {
        async fn tick(&mut self) {
            if self.rx.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
    }

    struct Harness {
        session: Arc<ScannerSession>,
        track: Arc<CountingTrack>,
        frames: watch::Sender<Option<Arc<Frame>>>,
        ticks: mpsc::UnboundedSender<()>,
        provider: Arc<ScriptedProvider>,
        camera: Arc<FakeCamera>,
    }

    fn frame() -> Arc<Frame> {
        Arc::new(Frame::new(DynamicImage::new_luma8(32, 32)))
    }

    fn harness_with(
        script: Vec<Result<Vec<DetectedCode>, DetectorError>>,
        first_frame: Option<Arc<Frame>>,
    ) -> Harness {
        let track = CountingTrack::new();
        let (frames, rx) = watch::channel(first_frame);
        let stream = VideoStream::new(vec![track.clone()], rx);
        let camera = FakeCamera::new(Ok(stream));
        let provider = ScriptedProvider::new(script);
        let (ticks, ticks_rx) = mpsc::unbounded_channel();

        let backend = ScannerBackend {
            camera: camera.clone(),
            detectors: Some(provider.clone()),
            sink: Arc::new(VideoSink::new()),
            clock: Arc::new(ManualClock {
                ticks: Mutex::new(Some(ticks_rx)),
            }),
            constraints: VideoConstraints::default(),
        };

        Harness {
            session: Arc::new(ScannerSession::new(backend)),
            track,
            frames,
            ticks,
            provider,
            camera,
        }
    }

    fn harness(script: Vec<Result<Vec<DetectedCode>, DetectorError>>) -> Harness {
        harness_with(script, Some(frame()))
    }

    fn backend_without_stream(
        camera: Arc<dyn Camera>,
        detectors: Option<Arc<dyn DetectorProvider>>,
    ) -> ScannerBackend {
        let (_ticks, ticks_rx) = mpsc::unbounded_channel();
        ScannerBackend {
            camera,
            detectors,
            sink: Arc::new(VideoSink::new()),
            clock: Arc::new(ManualClock {
                ticks: Mutex::new(Some(ticks_rx)),
            }),
            constraints: VideoConstraints::default(),
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    async fn wait_for_calls(provider: &ScriptedProvider, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while provider.calls() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("detector was not called often enough");
    }

    #[tokio::test]
    async fn missing_detector_is_unsupported_platform() {
        let camera = FakeCamera::new(Err(AcquireError::PermissionDenied));
        let session = ScannerSession::new(backend_without_stream(camera.clone(), None));

        let err = session.start().await.err().unwrap();

        assert_eq!(err, ScanError::UnsupportedPlatform);
        assert_eq!(session.state(), SessionState::Error(ScanError::UnsupportedPlatform));
        // Capability is checked before the camera is touched
        assert!(camera.requested.lock().unwrap().is_none());

        session.dismiss();
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn detector_without_qr_support_is_unsupported_platform() {
        let camera = FakeCamera::new(Err(AcquireError::PermissionDenied));
        let provider = Arc::new(ScriptedProvider {
            formats: Vec::new(),
            detector: ScriptedProvider::new(Vec::new()).detector.clone(),
        });
        let session = ScannerSession::new(backend_without_stream(camera, Some(provider)));

        assert_eq!(session.start().await.err(), Some(ScanError::UnsupportedPlatform));
    }

    #[tokio::test]
    async fn camera_denial_and_device_errors_are_surfaced() {
        let denied = ScannerSession::new(backend_without_stream(
            FakeCamera::new(Err(AcquireError::PermissionDenied)),
            Some(ScriptedProvider::new(Vec::new())),
        ));
        assert_eq!(denied.start().await.err(), Some(ScanError::PermissionDenied));

        let broken = ScannerSession::new(backend_without_stream(
            FakeCamera::new(Err(AcquireError::Device("device busy".into()))),
            Some(ScriptedProvider::new(Vec::new())),
        ));
        let err = broken.start().await.err().unwrap();
        assert_eq!(err, ScanError::DeviceError("device busy".into()));
        assert!(err.to_string().contains("device busy"));
        assert!(matches!(broken.state(), SessionState::Error(_)));
    }

    #[tokio::test]
    async fn requests_rear_camera_at_720p() {
        let h = harness(Vec::new());
        h.session.start().await.unwrap();

        let requested = h.camera.requested.lock().unwrap().unwrap();
        assert_eq!(requested.facing, FacingMode::Environment);
        assert_eq!((requested.ideal_width, requested.ideal_height), (1280, 720));
        h.session.stop();
    }

    #[tokio::test]
    async fn first_non_empty_decode_is_reported_once_and_releases_camera() {
        let h = harness(vec![
            Ok(Vec::new()),
            Err(DetectorError::Decode("blurry".into())),
            Ok(vec![DetectedCode::qr("https://example.com"), DetectedCode::qr("second")]),
            Ok(vec![DetectedCode::qr("never")]),
        ]);

        let pending = h.session.start().await.unwrap();
        assert_eq!(h.session.state(), SessionState::Active);

        for _ in 0..4 {
            h.ticks.send(()).unwrap();
        }

        let value = tokio::time::timeout(Duration::from_secs(2), pending.decoded())
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("https://example.com"));
        assert_eq!(h.session.state(), SessionState::Stopped);
        assert_eq!(h.track.stops(), 1);

        settle().await;
        assert_eq!(h.provider.calls(), 3);

        // Unmount after success is a no-op
        h.session.stop();
        assert_eq!(h.track.stops(), 1);
    }

    #[tokio::test]
    async fn empty_payload_is_not_a_scan() {
        let h = harness(vec![
            Ok(vec![DetectedCode::qr("")]),
            Ok(vec![DetectedCode::qr("hello")]),
        ]);
        let pending = h.session.start().await.unwrap();

        h.ticks.send(()).unwrap();
        wait_for_calls(&h.provider, 1).await;
        assert_eq!(h.session.state(), SessionState::Active);

        h.ticks.send(()).unwrap();
        let value = tokio::time::timeout(Duration::from_secs(2), pending.decoded())
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn empty_frames_keep_the_loop_running() {
        let h = harness(Vec::new());
        let mut pending = h.session.start().await.unwrap();

        for n in 1..=10 {
            h.ticks.send(()).unwrap();
            wait_for_calls(&h.provider, n).await;
        }
        settle().await;

        assert_eq!(h.provider.calls(), 10);
        assert_eq!(pending.try_take(), None);
        assert_eq!(h.session.state(), SessionState::Active);
        assert_eq!(h.track.stops(), 0);
        assert!(h.track.is_live());

        h.session.stop();
    }

    #[tokio::test]
    async fn cancel_mid_scan_releases_without_report() {
        let h = harness(Vec::new());
        let pending = h.session.start().await.unwrap();
        h.ticks.send(()).unwrap();
        wait_for_calls(&h.provider, 1).await;

        h.session.stop();

        assert_eq!(h.session.state(), SessionState::Stopped);
        assert_eq!(h.track.stops(), 1);
        assert_eq!(pending.decoded().await, None);

        // Further ticks are never processed
        let _ = h.ticks.send(());
        settle().await;
        assert_eq!(h.provider.calls(), 1);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let h = harness(Vec::new());
        let mut states = h.session.subscribe();
        h.session.start().await.unwrap();

        for _ in 0..5 {
            h.session.stop();
        }
        h.session.dismiss();

        assert_eq!(h.track.stops(), 1);
        assert_eq!(h.session.state(), SessionState::Stopped);

        states.borrow_and_update();
        h.session.stop();
        assert!(!states.has_changed().unwrap());
    }

    #[tokio::test]
    async fn stop_before_start_makes_start_a_no_op() {
        let h = harness(Vec::new());
        h.session.stop();

        let pending = h.session.start().await.unwrap();

        assert_eq!(pending.decoded().await, None);
        assert!(h.camera.requested.lock().unwrap().is_none());
        assert_eq!(h.session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn sessions_are_not_rearmed() {
        let h = harness(vec![Ok(vec![DetectedCode::qr("once")])]);
        let pending = h.session.start().await.unwrap();
        h.ticks.send(()).unwrap();
        assert_eq!(pending.decoded().await.as_deref(), Some("once"));

        let again = h.session.start().await.unwrap();
        assert_eq!(again.decoded().await, None);
        assert_eq!(h.session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn no_detection_before_the_sink_is_ready() {
        let h = harness_with(vec![Ok(vec![DetectedCode::qr("late")])], None);
        h.ticks.send(()).unwrap();

        let starter = tokio::spawn({
            let session = h.session.clone();
            async move { session.start().await }
        });
        settle().await;

        assert_eq!(h.session.state(), SessionState::Acquiring);
        assert_eq!(h.provider.calls(), 0);
        assert!(!starter.is_finished());

        h.frames.send(Some(frame())).unwrap();
        let pending = tokio::time::timeout(Duration::from_secs(2), starter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(pending.decoded().await.as_deref(), Some("late"));
    }

    #[tokio::test]
    async fn stop_while_waiting_for_video_releases_the_stream() {
        let h = harness_with(Vec::new(), None);

        let starter = tokio::spawn({
            let session = h.session.clone();
            async move { session.start().await }
        });
        settle().await;
        assert_eq!(h.session.state(), SessionState::Acquiring);

        h.session.stop();

        let pending = tokio::time::timeout(Duration::from_secs(2), starter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(pending.decoded().await, None);
        assert_eq!(h.track.stops(), 1);
        assert_eq!(h.session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn paused_video_ends_the_loop_silently() {
        let h = harness(Vec::new());
        let mut pending = h.session.start().await.unwrap();

        h.session.backend.sink.pause();
        h.ticks.send(()).unwrap();
        h.ticks.send(()).unwrap();
        settle().await;

        assert_eq!(h.provider.calls(), 0);
        assert_eq!(pending.try_take(), None);
        // The loop exiting does not tear the session down by itself
        assert_eq!(h.track.stops(), 0);

        h.session.stop();
        assert_eq!(h.track.stops(), 1);
    }

    #[tokio::test]
    async fn dropping_the_session_releases_the_camera() {
        let h = harness(Vec::new());
        h.session.start().await.unwrap();
        let track = h.track.clone();

        drop(h);

        assert_eq!(track.stops(), 1);
    }
}
