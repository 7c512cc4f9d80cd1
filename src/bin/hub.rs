use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use fleetwatch::{
    api::{ApiConfig, ApiState, spawn_api_server},
    config::{HubConfig, StorageConfig},
    notifier::ViewerRegistry,
    storage::{MemoryStore, SnapshotStore, SqliteStore},
};
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the SQLite database path
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Keep snapshots in memory only (no persistence)
    #[arg(long)]
    memory: bool,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("fleetwatch", LevelFilter::DEBUG),
        ("hub", LevelFilter::DEBUG),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let mut config = HubConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.memory {
        config.storage = StorageConfig::Memory;
    } else if let Some(path) = args.db {
        config.storage = StorageConfig::Sqlite { path };
    }

    let store: Arc<dyn SnapshotStore> = match &config.storage {
        StorageConfig::Memory => {
            info!("using in-memory snapshot store");
            Arc::new(MemoryStore::new())
        }
        StorageConfig::Sqlite { path } => Arc::new(SqliteStore::new(path).await?),
    };

    let notifier = Arc::new(ViewerRegistry::new());
    let state = ApiState::new(store.clone(), notifier, config.api_key.clone());

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    spawn_api_server(
        ApiConfig {
            bind_addr,
            enable_cors: true,
        },
        state,
    )
    .await?;

    info!("{}", store.stats().await?);

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    store.close().await?;

    Ok(())
}
