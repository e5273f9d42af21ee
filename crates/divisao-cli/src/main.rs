//! divisao - terminal client for the Divisão de Contas API.
//!
//! Logs in, keeps the session token between runs, and issues
//! authenticated requests against the API.

mod commands;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use divisao_core::config::{Config, StoreKind};
use divisao_core::App;

#[derive(Parser)]
#[command(name = "divisao", version, about = "Client for the Divisão de Contas API")]
struct Cli {
    /// API base URL (overrides config and DIVISAO_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where to keep the session token
    #[arg(long, value_enum, global = true)]
    store: Option<StoreArg>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreArg {
    File,
    Keyring,
    Memory,
}

impl From<StoreArg> for StoreKind {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::File => StoreKind::File,
            StoreArg::Keyring => StoreKind::Keyring,
            StoreArg::Memory => StoreKind::Memory,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        usuario: Option<String>,
        /// Prompted for when omitted
        #[arg(short = 'p', long)]
        senha: Option<String>,
    },
    /// End the session
    Logout,
    /// Show whether a session is active
    Status,
    /// Resolve a path through the route table
    Route { path: String },
    /// GET a path, with optional KEY=VALUE query parameters
    Get {
        path: String,
        params: Vec<String>,
    },
    /// POST a JSON body to a path
    Post { path: String, body: Option<String> },
    /// PUT a JSON body to a path
    Put { path: String, body: Option<String> },
    /// DELETE a path
    Delete { path: String },
    /// Show or persist the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration in effect, after flags and environment
    Show,
    /// Write the configuration in effect to the config file
    Save {
        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // RUST_LOG wins over -v
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "divisao.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let loaded = Config::load();
    let log_dir = loaded.as_ref().ok().and_then(|c| c.log_dir.clone());
    let _log_guard = init_tracing(cli.verbose, log_dir.as_deref());

    let mut config = match loaded {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    config.override_api_url(cli.api_url.clone());
    if let Some(store) = cli.store {
        config.store = store.into();
    }

    info!(api_url = %config.api_url, "divisao starting");
    let app = App::new(config)?;

    commands::run(&app, cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_save_takes_timeout() {
        let cli = Cli::try_parse_from(["divisao", "config", "save", "--timeout", "5"]).unwrap();
        match cli.command {
            Command::Config {
                action: ConfigAction::Save { timeout },
            } => assert_eq!(timeout, Some(5)),
            _ => panic!("expected config save"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["divisao", "config", "show", "--store", "keyring"]).unwrap();
        assert!(matches!(cli.store, Some(StoreArg::Keyring)));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }
}
