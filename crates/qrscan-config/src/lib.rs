use std::env;

use serde::{Deserialize, Serialize};

use self::camera::CameraConfig;
use self::history::HistoryConfig;
use self::scanner::ScannerConfig;
use self::ui::UiConfig;

pub mod camera;
pub mod history;
pub mod scanner;
pub mod ui;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub scanner: ScannerConfig,
    pub history: HistoryConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Build the config from process environment variables
    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            camera: CameraConfig::from_lookup(&lookup),
            scanner: ScannerConfig::from_lookup(&lookup),
            history: HistoryConfig::from_lookup(&lookup),
            ui: UiConfig::from_lookup(&lookup),
        }
    }
}

/// Parse a numeric variable, ignoring values that don't parse
pub(crate) fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
