use clap::Parser;
use fleetwatch::{
    actors::collector::CollectorHandle,
    config::AgentConfig,
    providers::default_providers,
};
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Override the sampling interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Override the machine name reported to the hub
    #[arg(short, long)]
    name: Option<String>,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("fleetwatch", LevelFilter::DEBUG),
        ("agent", LevelFilter::DEBUG),
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

    let mut config = AgentConfig::from_env()?;
    if let Some(interval) = args.interval {
        config.interval_secs = interval;
    }
    if let Some(name) = args.name {
        config.server_name = name;
    }

    info!(
        "reporting as '{}' to {} every {}s",
        config.server_name, config.server_url, config.interval_secs
    );

    let collector = CollectorHandle::spawn(config, default_providers());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    collector.shutdown().await?;

    Ok(())
}
