//! optionterm - interactive options shell with a live market-data panel.
//!
//! ## Usage
//!
//! ```bash
//! # Start a session
//! optionterm
//!
//! # Debug logging
//! optionterm -v
//!
//! # Keep everything under another directory
//! optionterm --data-dir /tmp/on
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use optionterm::{init_logging, install_panic_hook, Config, LogGuard, Unrecognized};
use tracing::{error, info};

/// Options Numerics terminal
///
/// A command shell with scrollback, history recall, search and a live
/// stream panel for subscribed symbols.
#[derive(Parser, Debug)]
#[command(name = "optionterm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to <data dir>/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory for the session log, history and subscriptions
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for log files (defaults to <data dir>/logs)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    let _guard = match setup_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::from(1);
        }
    };

    install_panic_hook();
    info!(data_dir = %config.data_dir.display(), "starting session");

    match optionterm::run(&config, Box::new(Unrecognized)) {
        Ok(()) => {
            println!("Happy trading!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "session failed");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn load_config(cli: &Cli) -> optionterm::Result<Config> {
    let path = Config::resolve_path(cli.config.as_deref(), cli.data_dir.as_deref())?;
    let config = Config::load(&path)?;
    Ok(match &cli.data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    })
}

fn setup_logging(cli: &Cli, config: &Config) -> optionterm::Result<LogGuard> {
    let log_dir = cli.log_dir.clone().unwrap_or_else(|| config.log_dir());
    init_logging(Some(log_dir), cli.verbose > 0)
}
