use serde::{Deserialize, Serialize};

use crate::parse_var;

fn default_toast_ms() -> u64 {
    3000
}

fn default_history_page() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// How long a toast stays on screen
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
    /// History rows drawn at once
    #[serde(default = "default_history_page")]
    pub history_page: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_ms: default_toast_ms(),
            history_page: default_history_page(),
        }
    }
}

impl UiConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            toast_ms: parse_var(lookup, "QRSCAN_TOAST_MS").unwrap_or_else(default_toast_ms),
            history_page: parse_var(lookup, "QRSCAN_HISTORY_PAGE")
                .unwrap_or_else(default_history_page),
        }
    }
}
