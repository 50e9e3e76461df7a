//! caseflow - a terminal shell for the caseflow test-management service.
//!
//! Drives the same session store, HTTP pipeline and navigation guard the web
//! views use: log in, check who you are, and visit views to see what the
//! guard lets through.

mod app;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use caseflow_core::config::{Config, TokenStorage};

use app::Shell;

/// Name of the rolling log file written when `CASEFLOW_LOG_DIR` is set
const LOG_FILE_PREFIX: &str = "caseflow.log";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend origin, e.g. http://localhost:8000
    #[arg(short, long, env = "CASEFLOW_SERVER_URL")]
    server: Option<String>,

    /// Where to keep the credential: file, keyring or memory
    #[arg(long, env = "CASEFLOW_TOKEN_STORAGE")]
    token_storage: Option<TokenStorage>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the credential
    Login {
        #[arg(short, long, env = "CASEFLOW_USERNAME")]
        username: Option<String>,
    },
    /// Forget the stored credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Navigate to a view, as the web app would
    Visit { path: String },
    /// List the application's views
    Routes,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`). When
/// `CASEFLOW_LOG_DIR` is set, a daily rolling file is written there too.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var("CASEFLOW_LOG_DIR") {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config(cli: &Cli) -> Config {
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    if let Some(ref server) = cli.server {
        config.server_url = server.clone();
    }
    if let Some(storage) = cli.token_storage {
        config.token_storage = storage;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();
    info!("caseflow starting");

    let config = load_config(&cli);
    let shell = Shell::new(config)?;

    let result = match cli.command {
        Command::Login { username } => shell.login(username).await,
        Command::Logout => shell.logout(),
        Command::Whoami => shell.whoami().await,
        Command::Visit { path } => shell.visit(&path).await,
        Command::Routes => shell.routes(),
    };
    shell.flush_notifications();

    result
}
