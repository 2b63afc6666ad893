mod app;
mod config;
mod context;

use std::path::PathBuf;

use clap::Parser;

use app::Worldkeep;
use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "worldkeep-server", about = "Authoritative world server core")]
struct Cli {
    #[arg(long, default_value = "worldkeep.json")]
    config: PathBuf,
}

fn init_logging(config: &ServerConfig) {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        builder.parse_filters(&config.log_filter);
    }
    builder.init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?;
    init_logging(&config);

    log::info!(target: "worldkeep", "starting with config from {}", cli.config.display());

    let world = Worldkeep::build(&config).await?;
    world.spawn_background_workers();

    tokio::signal::ctrl_c().await?;
    log::info!(target: "worldkeep", "shutdown requested, stopping workers");
    world.shutdown();

    Ok(())
}
