use std::sync::Arc;

use kanal::AsyncSender;
use qrscan_io::LinkOpener;
use qrscan_types::AppEvent;

pub async fn handle_open_link(
    opener: Arc<dyn LinkOpener>,
    url: String,
    ui_to_app_tx: AsyncSender<AppEvent>,
) {
    if let Err(e) = opener.open(&url).await {
        let _ = ui_to_app_tx
            .send(AppEvent::LinkOpenFailed(e.to_string()))
            .await;
    }
}
