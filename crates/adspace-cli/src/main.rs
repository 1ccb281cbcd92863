mod db;
mod traffic;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;
use crate::traffic::TrafficCommands;

#[derive(Debug, Parser)]
#[command(name = "adspace-cli")]
#[command(about = "adspace command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database connectivity and migrations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Foot-traffic enrichment for advertising locations
    Traffic {
        #[command(subcommand)]
        command: TrafficCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("adspace-cli ready; run with --help to list commands");
        return Ok(());
    };

    let config = adspace_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = adspace_db::connect_pool_from_config(&config).await?;

    match command {
        Commands::Db { command } => db::run(&pool, command).await,
        Commands::Traffic { command } => traffic::run(&pool, &config, command).await,
    }
}
