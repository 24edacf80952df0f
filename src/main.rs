mod config;
mod database;
mod error;
mod monitoring;
mod notify;
mod pool;
mod validation;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::database::LibsqlTargetStore;
use crate::monitoring::{MonitorSupervisor, Prober};
use crate::notify::{Notifier, NullNotifier, TelegramNotifier};
use crate::pool::{StoreManager, StorePool};

#[derive(Parser)]
#[command(name = "upwatch", about = "Uptime monitoring engine", version)]
struct Cli {
    /// Path to the config file (defaults to the XDG config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database path override
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("upwatch=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref())?;
    let db_path = cli.database.unwrap_or_else(|| config.database.path.clone());

    info!(database = %db_path, "starting upwatch");

    let db = libsql::Builder::new_local(&db_path).build().await?;
    let pool: StorePool = deadpool::managed::Pool::builder(StoreManager::new(db)).build()?;

    let conn = pool.get().await?;
    database::initialize_database(&conn).await?;
    drop(conn);

    let store = Arc::new(LibsqlTargetStore::new_from_pool(pool));

    let notifier: Arc<dyn Notifier> = match std::env::var("TELEGRAM_BOT_TOKEN") {
        Ok(token) if !token.is_empty() => {
            info!("Telegram notifications enabled");
            Arc::new(TelegramNotifier::new(token)?)
        }
        _ => {
            info!("TELEGRAM_BOT_TOKEN not set, transitions will only be logged");
            Arc::new(NullNotifier)
        }
    };

    let prober = Arc::new(Prober::new(config.probe.timeout_seconds)?);
    let supervisor = Arc::new(MonitorSupervisor::new(store, notifier, prober));

    let resumed = supervisor.resume_all().await?;
    info!(resumed, "monitoring engine running");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    supervisor.shutdown().await;

    Ok(())
}
