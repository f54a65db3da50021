use serde::{Deserialize, Serialize};

use crate::parse_var;

/// ~60 Hz, the usual display refresh
fn default_frame_interval_ms() -> u64 {
    16
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Pause between detection attempts
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl ScannerConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let frame_interval_ms = parse_var::<u64, _>(lookup, "QRSCAN_FRAME_INTERVAL_MS")
            .filter(|ms| *ms > 0)
            .unwrap_or_else(default_frame_interval_ms);

        Self { frame_interval_ms }
    }
}
