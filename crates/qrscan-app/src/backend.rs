use std::path::PathBuf;
use std::sync::Arc;

use qrscan_config::Config;
use qrscan_config::camera::{CameraSource, Facing};
use qrscan_scanner::{
    Camera, FacingMode, FrameDirCamera, IntervalClock, RqrrProvider, ScannerBackend,
    VideoConstraints, VideoSink,
};

/// Wire the desktop camera, detector and frame clock selected by the config
pub fn build_scanner_backend(config: &Config) -> anyhow::Result<ScannerBackend> {
    let camera: Arc<dyn Camera> = match config.camera.source {
        CameraSource::Frames => {
            let dir = frames_dir(config);
            tracing::info!("Camera: image frames from {}", dir.display());
            Arc::new(FrameDirCamera::new(dir, config.camera.fps))
        }
        CameraSource::Screen => screen_camera(config.camera.fps)?,
    };

    let constraints = VideoConstraints {
        facing: match config.camera.facing {
            Facing::Environment => FacingMode::Environment,
            Facing::User => FacingMode::User,
        },
        ideal_width: config.camera.ideal_width,
        ideal_height: config.camera.ideal_height,
    };

    Ok(ScannerBackend {
        camera,
        detectors: Some(Arc::new(RqrrProvider)),
        sink: Arc::new(VideoSink::new()),
        clock: Arc::new(IntervalClock::from_millis(config.scanner.frame_interval_ms)),
        constraints,
    })
}

fn frames_dir(config: &Config) -> PathBuf {
    config
        .camera
        .frames_dir
        .clone()
        .unwrap_or_else(|| config.history.data_dir.join("frames"))
}

#[cfg(feature = "screen-capture")]
fn screen_camera(fps: u32) -> anyhow::Result<Arc<dyn Camera>> {
    tracing::info!("Camera: primary monitor capture");
    Ok(Arc::new(qrscan_scanner::ScreenCamera::new(fps)))
}

#[cfg(not(feature = "screen-capture"))]
fn screen_camera(_fps: u32) -> anyhow::Result<Arc<dyn Camera>> {
    anyhow::bail!("QRSCAN_CAMERA=screen needs a build with the `screen-capture` feature")
}
