use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::parse_var;

fn default_ideal_width() -> u32 {
    1280
}

fn default_ideal_height() -> u32 {
    720
}

fn default_fps() -> u32 {
    15
}

/// Which device backs the "camera"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraSource {
    /// Directory of still images replayed as a video feed
    #[default]
    Frames,
    /// Primary monitor capture, needs the `screen-capture` feature
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Environment,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub source: CameraSource,
    pub facing: Facing,
    pub frames_dir: Option<PathBuf>,
    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,
    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,
    /// Feed rate of the frame-directory camera
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: CameraSource::default(),
            facing: Facing::default(),
            frames_dir: None,
            ideal_width: default_ideal_width(),
            ideal_height: default_ideal_height(),
            fps: default_fps(),
        }
    }
}

impl CameraConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = match lookup("QRSCAN_CAMERA").as_deref().map(str::trim) {
            Some("screen") => CameraSource::Screen,
            _ => CameraSource::Frames,
        };

        let fps = parse_var::<u32, _>(lookup, "QRSCAN_CAMERA_FPS")
            .filter(|fps| *fps > 0)
            .unwrap_or_else(default_fps);

        Self {
            source,
            frames_dir: lookup("QRSCAN_FRAMES_DIR").map(PathBuf::from),
            fps,
            ..Self::default()
        }
    }
}
