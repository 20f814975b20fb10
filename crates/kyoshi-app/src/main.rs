use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kyoshi_config::Config;
use kyoshi_storage::{FileStore, KeyValueStore};

mod controller;
mod events;
mod state;
mod terminal;
#[cfg(test)]
mod tests;

use controller::{AppController, ChannelSet};
use state::AppState;

/// Japanese grammar and vocabulary tutor with Burmese explanations.
#[derive(Parser)]
#[command(name = "kyoshi")]
struct Args {
    /// Data directory for persisted libraries (overrides KYOSHI_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::new();
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage.data_dir)?);

    let channels = ChannelSet::new(config.app_channel_capacity, config.ui_channel_capacity);
    let state = Arc::new(AppState::new(config, store));
    let controller = AppController::new(state, channels);
    let mut tasks = controller.spawn_tasks();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            controller.shutdown();
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Ok(()))) => tracing::info!("task finished"),
                Some(Ok(Err(e))) => tracing::error!("task failed: {e}"),
                Some(Err(e)) => tracing::error!("task panicked: {e}"),
                None => {}
            }
            controller.shutdown();
        }
    }

    Ok(())
}
