use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use qrscan_types::AppEvent;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;
use crate::view::{Effect, ViewController};

pub mod copy_text;
pub mod open_link;
pub mod scan;

use copy_text::handle_copy;
use open_link::handle_open_link;
use scan::ScanSlot;

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let toast_ttl = {
        let config = state.config.read().await;
        Duration::from_millis(config.ui.toast_ms)
    };

    let mut view = ViewController::new(state.storage.clone(), toast_ttl);
    let mut scans = ScanSlot::default();

    render(&view, &app_to_ui_tx).await?;

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    let result = loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break Ok(()),
            event = ui_to_app_rx.recv() => event?,
        };

        tracing::debug!("[EVENT_LOOP] {:?}", std::mem::discriminant(&event));
        let effects = handle_events(&mut view, event);

        let mut quit = false;
        for effect in effects {
            quit |= run_effect(&state, &mut scans, &ui_to_app_tx, effect);
        }

        if let Err(e) = render(&view, &app_to_ui_tx).await {
            break Err(e);
        }
        if quit {
            break Ok(());
        }
    };

    scans.stop_all();
    let _ = app_to_ui_tx.send(AppEvent::Shutdown).await;
    tracing::info!("[EVENT_LOOP] Stopped");

    result
}

fn handle_events(view: &mut ViewController, event: AppEvent) -> Vec<Effect> {
    let now = Instant::now();

    match event {
        AppEvent::UiEvent(event) => view.handle_ui(event, now),
        AppEvent::ScannerReady { session_id } => {
            view.on_scanner_ready(session_id);
            Vec::new()
        }
        AppEvent::ScanDecoded { session_id, text } => {
            let timestamp = chrono::Utc::now().timestamp_millis();
            view.on_scan_decoded(session_id, text, timestamp, now)
        }
        AppEvent::ScanFailed {
            session_id,
            failure,
        } => {
            view.on_scan_failed(session_id, failure);
            Vec::new()
        }
        AppEvent::ToastExpired(id) => {
            view.on_toast_expired(id);
            Vec::new()
        }
        AppEvent::CopyFinished { ok } => view.on_copy_finished(ok, now),
        AppEvent::LinkOpenFailed(reason) => {
            tracing::warn!("Link open failed: {}", reason);
            view.on_link_open_failed(now)
        }
        AppEvent::Shutdown => vec![Effect::Quit],
        AppEvent::Render(_) => {
            // UI-only event, ignore in backend
            Vec::new()
        }
    }
}

/// Execute one effect; returns true when the app should exit
fn run_effect(
    state: &Arc<AppState>,
    scans: &mut ScanSlot,
    ui_to_app_tx: &AsyncSender<AppEvent>,
    effect: Effect,
) -> bool {
    match effect {
        Effect::StartScan { session_id } => {
            scans.start(state.scanner_backend(), session_id, ui_to_app_tx.clone());
        }
        Effect::StopScan { session_id } => scans.stop(session_id),
        Effect::CopyText(text) => {
            tokio::spawn(handle_copy(
                state.clipboard.clone(),
                text,
                ui_to_app_tx.clone(),
            ));
        }
        Effect::OpenLink(url) => {
            tokio::spawn(handle_open_link(
                state.links.clone(),
                url,
                ui_to_app_tx.clone(),
            ));
        }
        Effect::ScheduleToastExpiry { id, after } => {
            let tx = ui_to_app_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                let _ = tx.send(AppEvent::ToastExpired(id)).await;
            });
        }
        Effect::Quit => return true,
    }

    false
}

async fn render(view: &ViewController, app_to_ui_tx: &AsyncSender<AppEvent>) -> anyhow::Result<()> {
    app_to_ui_tx
        .send(AppEvent::Render(view.snapshot(Instant::now())))
        .await?;
    Ok(())
}
