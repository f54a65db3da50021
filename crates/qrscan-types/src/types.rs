use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbologies the scanner can be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeFormat {
    #[serde(rename = "QR_CODE")]
    QrCode,
}

impl CodeFormat {
    /// Name used when configuring a detector
    pub fn detector_name(&self) -> &'static str {
        match self {
            CodeFormat::QrCode => "qr_code",
        }
    }
}

impl fmt::Display for CodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeFormat::QrCode => f.write_str("QR_CODE"),
        }
    }
}

/// One decoded scan, as stored in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub text: String,
    pub format: CodeFormat,
    /// Epoch millis
    pub timestamp: i64,
}

impl ScanResult {
    pub fn new(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            text: text.into(),
            format: CodeFormat::QrCode,
            timestamp,
        }
    }
}

/// What a decoded payload looks like to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Link,
    Text,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultKind::Link => f.write_str("LINK"),
            ResultKind::Text => f.write_str("TEXT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Scanning,
    Result,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFailureKind {
    UnsupportedPlatform,
    PermissionDenied,
    DeviceError,
}

/// Startup failure of a scanner session, flattened for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub kind: ScanFailureKind,
    pub message: String,
}

/// User actions coming from the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    StartScan,
    CloseScanner,
    ShowHistory,
    Back,
    SelectHistory(usize),
    CopyResult,
    OpenResult,
    ScanAnother,
    RequestClearHistory,
    ConfirmClearHistory,
    CancelClearHistory,
    Quit,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    UiEvent(UiEvent),
    /// Camera is streaming and the detection loop is running
    ScannerReady {
        session_id: u64,
    },
    ScanDecoded {
        session_id: u64,
        text: String,
    },
    ScanFailed {
        session_id: u64,
        failure: ScanFailure,
    },
    ToastExpired(u64),
    CopyFinished {
        ok: bool,
    },
    LinkOpenFailed(String),
    Render(ViewSnapshot),
    Shutdown,
}

/// Everything the front end needs to draw one frame of the app
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewSnapshot {
    pub screen: Screen,
    pub scanner: ScannerView,
    pub current: Option<ResultView>,
    pub history: Vec<HistoryItemView>,
    pub toast: Option<String>,
    pub confirm_clear: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScannerView {
    pub loading: bool,
    pub error: Option<ScanFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub text: String,
    pub kind: ResultKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItemView {
    pub text: String,
    pub kind: ResultKind,
    /// Short day/month label
    pub date: String,
}
