//! Entry point: load configuration, install logging, wire the pipeline and serve.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use referral_service::{
    build_app, config::AppConfig, logging::init_logging, run_server, AppState,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "referral-service", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.logging = config.logging.with_verbosity(cli.verbose);
    init_logging(&config.logging);

    let addr = config.listen_addr()?;
    let cors = config.cors.layer()?;
    let state = AppState::from_config(&config)?;

    info!(
        model = %config.runtime.model,
        runtime = %config.runtime.base_url,
        "starting referral service"
    );

    let app = build_app(state).layer(cors);
    run_server(app, addr).await.context("server failed")?;

    Ok(())
}
