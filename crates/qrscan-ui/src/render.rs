use std::fmt::Write;

use qrscan_types::{ResultKind, ScanFailureKind, Screen, ViewSnapshot};

use crate::page::HistoryPager;

const PREVIEW_CHARS: usize = 60;

/// Draw a snapshot as plain terminal text
pub fn render(view: &ViewSnapshot, pager: &HistoryPager) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== QR Scan ===");

    match view.screen {
        Screen::Home => {
            let _ = writeln!(out, "  s) Scan a code");
            let _ = writeln!(out, "  h) History");
            let _ = writeln!(out, "  q) Quit");
        }
        Screen::Scanning => {
            if let Some(failure) = &view.scanner.error {
                let _ = writeln!(out, "  ! {}", failure.message);
                if let Some(hint) = failure_hint(failure.kind) {
                    let _ = writeln!(out, "  {hint}");
                }
                let _ = writeln!(out, "  x) Dismiss");
            } else if view.scanner.loading {
                let _ = writeln!(out, "  Starting camera...");
                let _ = writeln!(out, "  x) Cancel");
            } else {
                let _ = writeln!(out, "  Point the camera at a QR code");
                let _ = writeln!(out, "  x) Close");
            }
        }
        Screen::Result => {
            if let Some(result) = &view.current {
                let _ = writeln!(out, "  [{}]", result.kind);
                for line in result.text.lines() {
                    let _ = writeln!(out, "  {line}");
                }
                let _ = writeln!(out);
                let _ = write!(out, "  c) Copy");
                if result.kind == ResultKind::Link {
                    let _ = write!(out, "  o) Open link");
                }
                let _ = writeln!(out, "  n) Scan another  b) Back");
            }
        }
        Screen::History => {
            if view.history.is_empty() {
                let _ = writeln!(out, "  No scans yet");
            }
            let total = view.history.len();
            let rows = pager.range(total);
            for (i, item) in view.history[rows.clone()].iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {:>2}. [{}] {} {}",
                    rows.start + i + 1,
                    item.kind,
                    preview(&item.text),
                    item.date
                );
            }
            let pages = pager.pages(total);
            if pages > 1 {
                let _ = write!(out, "  page {}/{}", pager.index() + 1, pages);
                if pager.index() > 0 {
                    let _ = write!(out, "  <) Prev");
                }
                if pager.index() + 1 < pages {
                    let _ = write!(out, "  >) Next, {} more", total - rows.end);
                }
                let _ = writeln!(out);
            }

            let _ = writeln!(out);
            if view.confirm_clear {
                let _ = writeln!(out, "  Clear all history? y) Yes  n) No");
            } else if view.history.is_empty() {
                let _ = writeln!(out, "  b) Back");
            } else {
                let _ = writeln!(out, "  <row>) Open  d) Clear history  b) Back");
            }
        }
    }

    if let Some(toast) = &view.toast {
        let _ = writeln!(out, "\n  >> {toast}");
    }

    out.push_str("> ");
    out
}

/// What the user can do about a failed scanner start
fn failure_hint(kind: ScanFailureKind) -> Option<&'static str> {
    match kind {
        ScanFailureKind::PermissionDenied => Some("Grant camera access, then scan again."),
        ScanFailureKind::DeviceError => {
            Some("Check that a camera is connected, or point QRSCAN_FRAMES_DIR at captured frames.")
        }
        // Retrying will not help
        ScanFailureKind::UnsupportedPlatform => None,
    }
}

/// First line of `text`, shortened to fit one row
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > PREVIEW_CHARS || line.len() < text.len() {
        let short: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{short}…")
    } else {
        line.to_owned()
    }
}
