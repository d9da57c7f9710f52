//! Horizon console - account management for Horizon Travel from the terminal.
//!
//! Signs in against the Horizon backend, keeps the session in a local cookie
//! jar, and shows the console navigation the signed-in role is allowed to see.

mod commands;
mod render;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use horizon_core::Config;

#[derive(Parser)]
#[command(name = "horizon", version, about = "Horizon Travel account console")]
struct Cli {
    /// Backend base URL (overrides config and HORIZON_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami {
        #[arg(long)]
        json: bool,
    },
    /// Refetch the signed-in user's profile from the server
    Refresh,
    /// Change your own password
    Passwd,
    /// Reset another user's password (admin)
    AdminPasswd {
        /// Id of the account to reset
        user_id: i64,
    },
    /// Show the console navigation for the signed-in user
    Nav {
        #[arg(long)]
        json: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    info!(backend = %config.backend_url, environment = %config.environment, "Horizon console starting");

    let auth = config.auth_service()?;

    match cli.command {
        Command::Login { username } => commands::login(&auth, &mut config, username).await,
        Command::Register { username, email } => {
            commands::register(&auth, &mut config, &username, &email).await
        }
        Command::Logout => commands::logout(&auth),
        Command::Whoami { json } => commands::whoami(&auth, json),
        Command::Refresh => commands::refresh(&auth).await,
        Command::Passwd => commands::change_password(&auth).await,
        Command::AdminPasswd { user_id } => commands::admin_reset_password(&auth, user_id).await,
        Command::Nav { json } => commands::nav(&auth, json),
    }
}
