use arboard::Clipboard;
use tokio::sync::oneshot;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(#[source] arboard::Error),

    #[error("clipboard write failed: {0}")]
    Write(#[source] arboard::Error),

    #[error("clipboard worker failed: {0}")]
    Worker(String),
}

/// Write-only clipboard access
#[async_trait::async_trait]
pub trait ClipboardWriter: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Something that can hold clipboard text while it stays alive
trait TextBoard {
    fn set_text(&mut self, text: String) -> Result<(), arboard::Error>;
}

impl TextBoard for Clipboard {
    fn set_text(&mut self, text: String) -> Result<(), arboard::Error> {
        Clipboard::set_text(self, text)
    }
}

type CopyRequest = (String, oneshot::Sender<Result<(), ClipboardError>>);

/// The desktop clipboard via `arboard`.
///
/// On X11 and Wayland the copied text is served by the process that owns the
/// `Clipboard`, so one instance lives on a dedicated thread for the whole run.
pub struct SystemClipboard {
    requests: kanal::AsyncSender<CopyRequest>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::with_board(Clipboard::new)
    }

    fn with_board<B, F>(open: F) -> Self
    where
        B: TextBoard,
        F: FnMut() -> Result<B, arboard::Error> + Send + 'static,
    {
        let (tx, rx) = kanal::bounded(8);

        std::thread::Builder::new()
            .name("clipboard".into())
            .spawn(move || serve(open, rx))
            .map_err(|e| tracing::error!("Failed to start clipboard thread: {e}"))
            .ok();

        Self {
            requests: tx.to_async(),
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ClipboardWriter for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let chars = text.chars().count();
        let (reply, done) = oneshot::channel();

        self.requests
            .send((text.to_owned(), reply))
            .await
            .map_err(|_| ClipboardError::Worker("clipboard thread is not running".into()))?;
        done.await
            .map_err(|_| ClipboardError::Worker("clipboard thread dropped the request".into()))??;

        tracing::debug!("Copied {} chars to clipboard", chars);
        Ok(())
    }
}

/// Owns the clipboard, opened on first use and kept until the app exits
fn serve<B, F>(mut open: F, requests: kanal::Receiver<CopyRequest>)
where
    B: TextBoard,
    F: FnMut() -> Result<B, arboard::Error>,
{
    let mut board: Option<B> = None;

    while let Ok((text, reply)) = requests.recv() {
        if board.is_none() {
            match open() {
                Ok(opened) => board = Some(opened),
                Err(e) => {
                    let _ = reply.send(Err(ClipboardError::Unavailable(e)));
                    continue;
                }
            }
        }

        let result = match board.as_mut() {
            Some(board) => board.set_text(text).map_err(ClipboardError::Write),
            None => Err(ClipboardError::Worker("clipboard not open".into())),
        };
        let _ = reply.send(result);
    }

    tracing::debug!("Clipboard thread stopped");
}
