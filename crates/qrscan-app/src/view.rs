use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use qrscan_core::{HistoryStore, Storage, classify};
use qrscan_types::{
    HistoryItemView, ResultKind, ResultView, ScanFailure, ScanResult, ScannerView, Screen,
    UiEvent, ViewSnapshot,
};
use tokio::time::Instant;

pub const TOAST_COPIED: &str = "Copied to clipboard!";
pub const TOAST_COPY_FAILED: &str = "Could not copy.";
pub const TOAST_LINK_FAILED: &str = "Could not open link.";
pub const TOAST_HISTORY_FAILED: &str = "History could not be saved.";

/// Side effects requested by the view, executed by the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartScan { session_id: u64 },
    StopScan { session_id: u64 },
    CopyText(String),
    OpenLink(String),
    ScheduleToastExpiry { id: u64, after: Duration },
    Quit,
}

#[derive(Debug, Clone)]
struct Toast {
    id: u64,
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct ScannerOverlay {
    loading: bool,
    error: Option<ScanFailure>,
}

/// Screen state machine: Home, Scanning, Result and History
pub struct ViewController {
    screen: Screen,
    current: Option<ScanResult>,
    scanner: ScannerOverlay,
    session: Option<u64>,
    next_session: u64,
    toast: Option<Toast>,
    next_toast: u64,
    toast_ttl: Duration,
    confirm_clear: bool,
    history: HistoryStore<Arc<dyn Storage>>,
}

impl ViewController {
    pub fn new(storage: Arc<dyn Storage>, toast_ttl: Duration) -> Self {
        let history = HistoryStore::open(storage);
        tracing::info!("History has {} entries", history.len());

        Self {
            screen: Screen::Home,
            current: None,
            scanner: ScannerOverlay::default(),
            session: None,
            next_session: 1,
            toast: None,
            next_toast: 1,
            toast_ttl,
            confirm_clear: false,
            history,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn current(&self) -> Option<&ScanResult> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[ScanResult] {
        self.history.entries()
    }

    /// Id of the session the scanning screen is waiting on
    pub fn active_session(&self) -> Option<u64> {
        self.session
    }

    pub fn handle_ui(&mut self, event: UiEvent, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();

        match (self.screen, event) {
            (_, UiEvent::Quit) => {
                self.stop_session(&mut effects);
                effects.push(Effect::Quit);
            }

            (Screen::Home, UiEvent::StartScan) => self.begin_scan(&mut effects),
            (Screen::Home, UiEvent::ShowHistory) => {
                self.confirm_clear = false;
                self.screen = Screen::History;
            }

            (Screen::Scanning, UiEvent::CloseScanner | UiEvent::Back) => {
                self.stop_session(&mut effects);
                self.screen = Screen::Home;
            }

            (Screen::Result, UiEvent::CopyResult) => {
                if let Some(result) = &self.current {
                    effects.push(Effect::CopyText(result.text.clone()));
                }
            }
            (Screen::Result, UiEvent::OpenResult) => match &self.current {
                Some(result) if classify(&result.text) == ResultKind::Link => {
                    effects.push(Effect::OpenLink(result.text.clone()));
                }
                _ => tracing::debug!("Open ignored: current result is not a link"),
            },
            (Screen::Result, UiEvent::ScanAnother) => {
                self.current = None;
                self.begin_scan(&mut effects);
            }

            (Screen::History, UiEvent::SelectHistory(index)) if !self.confirm_clear => {
                match self.history.get(index) {
                    Some(entry) => {
                        self.current = Some(entry.clone());
                        self.screen = Screen::Result;
                    }
                    None => tracing::debug!("No history entry at {}", index),
                }
            }
            (Screen::History, UiEvent::RequestClearHistory) => {
                self.confirm_clear = !self.history.is_empty();
            }
            (Screen::History, UiEvent::ConfirmClearHistory) if self.confirm_clear => {
                self.confirm_clear = false;
                if let Err(e) = self.history.clear() {
                    tracing::warn!("Failed to clear history: {e}");
                    self.show_toast(TOAST_HISTORY_FAILED, now, &mut effects);
                }
            }
            (Screen::History, UiEvent::CancelClearHistory) => self.confirm_clear = false,

            (Screen::Result | Screen::History, UiEvent::Back) => {
                self.confirm_clear = false;
                self.current = None;
                self.screen = Screen::Home;
            }

            (screen, event) => {
                tracing::debug!("Ignoring {:?} on {:?}", event, screen);
            }
        }

        effects
    }

    pub fn on_scanner_ready(&mut self, session_id: u64) {
        if self.is_current_session(session_id) {
            self.scanner.loading = false;
        }
    }

    pub fn on_scan_failed(&mut self, session_id: u64, failure: ScanFailure) {
        if !self.is_current_session(session_id) {
            return;
        }
        tracing::warn!("Scanner failed: {}", failure.message);
        self.scanner.loading = false;
        self.scanner.error = Some(failure);
    }

    /// A session reported its code: record it and show it
    pub fn on_scan_decoded(
        &mut self,
        session_id: u64,
        text: String,
        timestamp: i64,
        now: Instant,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.is_current_session(session_id) {
            tracing::debug!("Dropping decode from stale session {}", session_id);
            return effects;
        }

        // The session has already torn itself down
        self.session = None;
        self.scanner = ScannerOverlay::default();

        let entry = ScanResult::new(text, timestamp);
        let persisted = self.history.append(entry.clone()).map(|_| ());
        if let Err(e) = persisted {
            tracing::warn!("Failed to persist history: {e}");
            self.show_toast(TOAST_HISTORY_FAILED, now, &mut effects);
        }

        self.current = Some(entry);
        self.screen = Screen::Result;
        effects
    }

    pub fn on_copy_finished(&mut self, ok: bool, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        let message = if ok { TOAST_COPIED } else { TOAST_COPY_FAILED };
        self.show_toast(message, now, &mut effects);
        effects
    }

    pub fn on_link_open_failed(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.show_toast(TOAST_LINK_FAILED, now, &mut effects);
        effects
    }

    pub fn on_toast_expired(&mut self, id: u64) {
        if self.toast.as_ref().is_some_and(|t| t.id == id) {
            self.toast = None;
        }
    }

    pub fn snapshot(&self, now: Instant) -> ViewSnapshot {
        ViewSnapshot {
            screen: self.screen,
            scanner: ScannerView {
                loading: self.scanner.loading,
                error: self.scanner.error.clone(),
            },
            current: self.current.as_ref().map(|r| ResultView {
                text: r.text.clone(),
                kind: classify(&r.text),
            }),
            history: self
                .history
                .entries()
                .iter()
                .map(|r| HistoryItemView {
                    text: r.text.clone(),
                    kind: classify(&r.text),
                    date: date_label(r.timestamp),
                })
                .collect(),
            toast: self
                .toast
                .as_ref()
                .filter(|t| t.expires_at > now)
                .map(|t| t.message.clone()),
            confirm_clear: self.confirm_clear,
        }
    }

    fn begin_scan(&mut self, effects: &mut Vec<Effect>) {
        self.stop_session(effects);

        let session_id = self.next_session;
        self.next_session += 1;
        self.session = Some(session_id);
        self.scanner = ScannerOverlay {
            loading: true,
            error: None,
        };
        self.screen = Screen::Scanning;
        effects.push(Effect::StartScan { session_id });
    }

    fn stop_session(&mut self, effects: &mut Vec<Effect>) {
        if let Some(session_id) = self.session.take() {
            effects.push(Effect::StopScan { session_id });
        }
        self.scanner = ScannerOverlay::default();
    }

    fn is_current_session(&self, session_id: u64) -> bool {
        self.screen == Screen::Scanning && self.session == Some(session_id)
    }

    fn show_toast(&mut self, message: &str, now: Instant, effects: &mut Vec<Effect>) {
        let id = self.next_toast;
        self.next_toast += 1;
        self.toast = Some(Toast {
            id,
            message: message.to_owned(),
            expires_at: now + self.toast_ttl,
        });
        effects.push(Effect::ScheduleToastExpiry {
            id,
            after: self.toast_ttl,
        });
    }
}

/// Short local day/month label for a history row
pub fn date_label(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|utc| utc.with_timezone(&Local).format("%d/%m").to_string())
        .unwrap_or_default()
}
