use anyhow::Result;
use std::fs::{self, OpenOptions};

use routebook_core::{
    config::{self, AppConfig},
    StateContainer, SyncCore,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let core = SyncCore::from_config(&config)?;
    let watcher = tokio::spawn(log_state_changes(core.state().clone()));

    let report = core.cold_start().await;
    info!(
        "ready: signed in={}, favorites={}, routes={} ({:?})",
        report.session_restored, report.favorites, report.routes, report.origin
    );

    watcher.abort();
    Ok(())
}

async fn log_state_changes(state: StateContainer) {
    let mut updates = state.subscribe();
    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        info!(
            authenticated = snapshot.session.is_authenticated(),
            session_loading = snapshot.session.loading,
            routes = snapshot.catalog.routes.len(),
            favorites = snapshot.catalog.favorites.len(),
            catalog_loading = snapshot.catalog.loading,
            "state changed"
        );
    }
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("routebook.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
