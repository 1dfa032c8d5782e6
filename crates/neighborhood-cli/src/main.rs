//! Smart Neighborhood CLI - community management from the terminal.
//!
//! Residents, security schedules, announcements and feedback gated by the
//! session's role, plus a driver for the web front-end's offline cache.

mod cli;
mod commands;
mod render;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use neighborhood_core::ActionError;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Args, Command};
use commands::App;

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes buffered log lines when dropped.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

/// Print an error unless a notice already told the user about it.
pub(crate) fn report_error(error: &anyhow::Error) {
    let already_notified = error
        .downcast_ref::<ActionError>()
        .is_some_and(ActionError::is_access_denied);
    if !already_notified {
        eprintln!("Error: {:#}", error);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut app = App::new(args.data_dir)?;
    match args.command {
        Command::Shell => commands::run_shell(&mut app).await,
        command => app.run(command).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let _guard = init_tracing();
    info!("Smart Neighborhood CLI starting");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
