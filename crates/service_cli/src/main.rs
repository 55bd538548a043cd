//! bs-pinn - Black-Scholes pricing from the command line
//!
//! Entry point for the closed-form pricer and the physics-informed neural
//! network trainer.
//!
//! # Commands
//!
//! - `bs-pinn price` - Call and put prices with greeks
//! - `bs-pinn surface` - Price surface over a spot/maturity grid (CSV)
//! - `bs-pinn greeks` - Greek profile across spot
//! - `bs-pinn train` - Train a PINN and compare it with the analytic price
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate only parses arguments,
//! wires logging and formats results; every number comes from
//! `pricer_models` or `pricer_pinn`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use config::{CliConfig, LogLevel};

/// Black-Scholes analytic and PINN pricer
#[derive(Parser)]
#[command(name = "bs-pinn")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "bs-pinn.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "BS_PINN_LOG_LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a European call and put with all greeks
    Price(commands::price::PriceArgs),

    /// Price a European option over a spot/maturity grid
    Surface(commands::surface::SurfaceArgs),

    /// Greeks of a European option across a spot grid
    Greeks(commands::greeks::GreeksArgs),

    /// Train a PINN on the Black-Scholes PDE
    Train(commands::train::TrainArgs),
}

/// Initialise the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` applies. Logs go to stderr
/// so that CSV and JSON on stdout stay machine-readable.
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolve the log level: flag or environment, then `--verbose`, then the
/// configuration file.
fn resolve_log_level(cli_level: Option<LogLevel>, verbose: bool, config: &CliConfig) -> LogLevel {
    cli_level
        .or(verbose.then_some(LogLevel::Debug))
        .or(config.log_level())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::from_file(&cli.config)?;
    init_tracing(resolve_log_level(cli.log_level, cli.verbose, &config));

    info!(version = env!("CARGO_PKG_VERSION"), "bs-pinn starting");
    debug!(config = %cli.config.display(), "configuration loaded");

    match cli.command {
        Commands::Price(args) => commands::price::run(&args),
        Commands::Surface(args) => commands::surface::run(&args),
        Commands::Greeks(args) => commands::greeks::run(&args),
        Commands::Train(args) => commands::train::run(args, &config).await,
    }
}
