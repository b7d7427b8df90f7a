//! segpush: build, sign and register synthetic path segments.
//!
//! Subcommands: push, init.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::LoggingConfig;

/// segpush: seed a path store with synthetic segments.
#[derive(Parser, Debug)]
#[command(name = "segpush", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build segments from a topology description and commit them.
    Push(commands::push::PushArgs),
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Push(args) => {
            let config = commands::push::load_config(args)?;
            init_tracing(&config.logging);
            tracing::info!("segpush v{}", env!("CARGO_PKG_VERSION"));
            commands::push::run(&config, args.dry_run)
        }
        Commands::Init(args) => {
            init_tracing(&LoggingConfig::default());
            commands::init::run(args)
        }
    }
}
