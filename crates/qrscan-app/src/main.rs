use std::sync::Arc;
use std::time::Duration;

use qrscan_config::Config;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod backend;
mod controller;
mod events;
mod state;
mod ui;
mod view;


use self::controller::AppController;
use self::state::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::new();
    tracing::debug!("Config: {:?}", config);

    let state = Arc::new(AppState::new(config)?);
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();

    tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => tracing::info!("Shutdown requested"),
                Err(e) => tracing::error!("Failed to listen for ctrl+c: {e}"),
            }
        }
        Some(result) = tasks.join_next() => log_task_exit(result),
    }

    controller.shutdown();

    // Give the event loop a moment to release the camera
    while let Ok(Some(result)) =
        tokio::time::timeout(Duration::from_secs(2), tasks.join_next()).await
    {
        log_task_exit(result);
    }

    Ok(())
}

fn log_task_exit(result: Result<anyhow::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => tracing::debug!("task exited"),
        Ok(Err(e)) => tracing::error!("task failed: {e:#}"),
        Err(e) => tracing::error!("task panicked: {e}"),
    }
}

/// Logs go to stderr; stdout belongs to the terminal UI
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}
