use std::sync::Arc;

use kanal::AsyncSender;
use qrscan_io::ClipboardWriter;
use qrscan_types::AppEvent;

pub async fn handle_copy(
    clipboard: Arc<dyn ClipboardWriter>,
    text: String,
    ui_to_app_tx: AsyncSender<AppEvent>,
) {
    let ok = match clipboard.write_text(&text).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Copy failed: {}", e);
            false
        }
    };

    if let Err(e) = ui_to_app_tx.send(AppEvent::CopyFinished { ok }).await {
        tracing::error!("Failed to report copy result: {}", e);
    }
}
