pub mod backend;
pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod poller;
pub mod router;
pub mod shell;
pub mod state;
pub mod views;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use aasrah_store::database::{default_data_dir, Database};
use aasrah_store::LocalStorage;
use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

pub use crate::error::AppError;

use crate::config::ClientConfig;
use crate::shell::Shell;
use crate::state::AppState;

pub async fn run() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("aasrah_client=debug,aasrah_remote=info,aasrah_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Aasrah client v{}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    let data_dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir().context("No data directory for this platform")?,
    };

    let db = Database::open_in(&data_dir)
        .with_context(|| format!("Failed to open database in {}", data_dir.display()))?
        .into_shared();
    let storage = LocalStorage::new(db.clone());

    let services = backend::connect(&config, db, storage.clone(), &data_dir).await?;
    let state = Arc::new(AppState::new(services, storage, config));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Shell::new(state).run(stdin, tokio::io::stdout()).await?;

    tracing::info!("Goodbye");
    Ok(())
}
