use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use workload_bench::{
    Workload,
    api::{ApiConfig, ApiState, spawn_api_server},
    client::{WallClockTimestamps, http::HttpClientFactory},
    config::{Config, read_config_file},
};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (defaults apply when omitted)
    #[arg(short, long)]
    file: Option<String>,

    /// Override the listen address from the config
    #[arg(long)]
    listen: Option<SocketAddr>,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("workload_bench", LevelFilter::TRACE),
        ("tower_http", LevelFilter::DEBUG),
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

    let mut config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    }
    .with_env_overrides();
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    config.validate()?;

    let factory =
        HttpClientFactory::new(config.database.clone(), config.workload.request_timeout())?;
    let workload = Workload::new(
        Arc::new(factory),
        Arc::new(WallClockTimestamps),
        config.workload.clone(),
    );

    let api_config = ApiConfig {
        bind_addr: config.listen,
        enable_cors: true,
    };
    let addr = spawn_api_server(api_config, ApiState::new(workload.clone(), config)).await?;
    info!("accepting commands on http://{addr}");

    tokio::signal::ctrl_c().await?;
    info!("interrupted, shutting down");
    workload.shutdown().await;

    Ok(())
}
