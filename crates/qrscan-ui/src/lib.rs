use std::io::BufRead;
use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use qrscan_config::Config;
use qrscan_types::{AppEvent, Screen, UiEvent, ViewSnapshot};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

pub mod input;
pub mod page;
pub mod render;

use self::input::{Command, parse_command};
use self::page::HistoryPager;
use self::render::render;

/// Terminal front end: prints every render snapshot and turns typed commands into events
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
    config: Arc<RwLock<Config>>,
) -> anyhow::Result<()> {
    let mut pager = HistoryPager::new(config.read().await.ui.history_page);
    let lines = spawn_stdin_reader();
    let mut stdout = tokio::io::stdout();
    let mut view = ViewSnapshot::default();

    loop {
        tokio::select! {
            event = app_to_ui_rx.recv() => match event {
                Ok(AppEvent::Render(snapshot)) => {
                    if snapshot.screen == Screen::History {
                        pager.clamp(snapshot.history.len());
                    } else {
                        pager.reset();
                    }
                    stdout.write_all(render(&snapshot, &pager).as_bytes()).await?;
                    stdout.flush().await?;
                    view = snapshot;
                }
                Ok(AppEvent::Shutdown) | Err(_) => break,
                Ok(other) => {
                    tracing::trace!("[UI] Ignoring {:?}", std::mem::discriminant(&other));
                }
            },
            line = lines.recv() => {
                let Ok(line) = line else {
                    tracing::debug!("[UI] Input closed");
                    let _ = ui_to_app_tx.send(AppEvent::UiEvent(UiEvent::Quit)).await;
                    break;
                };
                match parse_command(&line, &view) {
                    Some(Command::App(event)) => {
                        tracing::debug!("[UI] {:?}", event);
                        ui_to_app_tx.send(AppEvent::UiEvent(event)).await?;
                    }
                    Some(Command::NextPage) => {
                        if pager.next(view.history.len()) {
                            stdout.write_all(render(&view, &pager).as_bytes()).await?;
                        } else {
                            stdout.write_all(b"  (last page)\n> ").await?;
                        }
                        stdout.flush().await?;
                    }
                    Some(Command::PrevPage) => {
                        if pager.prev() {
                            stdout.write_all(render(&view, &pager).as_bytes()).await?;
                        } else {
                            stdout.write_all(b"  (first page)\n> ").await?;
                        }
                        stdout.flush().await?;
                    }
                    None if line.trim().is_empty() => {}
                    None => {
                        stdout.write_all(b"  ? unknown command\n> ").await?;
                        stdout.flush().await?;
                    }
                }
            }
        }
    }

    tracing::info!("[UI] Terminal front end stopped");
    Ok(())
}

/// Read stdin on a dedicated thread; blocking reads would otherwise pin the runtime at shutdown
fn spawn_stdin_reader() -> AsyncReceiver<String> {
    let (tx, rx) = kanal::bounded(16);

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx.to_async()
}
