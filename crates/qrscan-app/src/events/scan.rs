use std::sync::Arc;

use kanal::AsyncSender;
use qrscan_scanner::{ScannerBackend, ScannerSession};
use qrscan_types::AppEvent;

/// The one scanner session the app may hold at a time
#[derive(Default)]
pub struct ScanSlot {
    active: Option<(u64, Arc<ScannerSession>)>,
}

impl ScanSlot {
    pub fn start(&mut self, backend: ScannerBackend, session_id: u64, tx: AsyncSender<AppEvent>) {
        self.stop_all();

        let session = Arc::new(ScannerSession::new(backend));
        self.active = Some((session_id, session.clone()));
        tracing::debug!("Starting scanner session {}", session_id);

        tokio::spawn(run_session(session, session_id, tx));
    }

    pub fn stop(&mut self, session_id: u64) {
        match &self.active {
            Some((id, _)) if *id == session_id => self.stop_all(),
            _ => tracing::debug!("Session {} already gone", session_id),
        }
    }

    pub fn stop_all(&mut self) {
        if let Some((id, session)) = self.active.take() {
            tracing::debug!("Stopping scanner session {}", id);
            session.stop();
        }
    }
}

async fn run_session(session: Arc<ScannerSession>, session_id: u64, tx: AsyncSender<AppEvent>) {
    let pending = match session.start().await {
        Ok(pending) => pending,
        Err(e) => {
            let _ = tx
                .send(AppEvent::ScanFailed {
                    session_id,
                    failure: e.to_failure(),
                })
                .await;
            return;
        }
    };

    if tx.send(AppEvent::ScannerReady { session_id }).await.is_err() {
        return;
    }

    // The slot owns the session from here; this task only waits for its report
    drop(session);

    if let Some(text) = pending.decoded().await {
        tracing::debug!("Session {} decoded {} bytes", session_id, text.len());
        let _ = tx.send(AppEvent::ScanDecoded { session_id, text }).await;
    }
}
