//! entra-user-check - Azure AD active user lookup
//!
//! Checks whether an enabled Azure AD account exists for a given email, using
//! an app registration's client credentials and the Microsoft Graph users API.

#![deny(clippy::all)]

mod auth;
mod check;
mod config;
mod directory;
mod error;
mod event;
mod secure;
#[cfg(test)]
mod test_support;

use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use check::{run_check, CheckOutcome};
use config::Config;
use error::{AppError, InputError};
use event::InvocationEvent;

/// Check whether an active Azure AD user exists for an email address.
///
/// Credentials are read from AZURE_AUTH_CLIENT_ID, AZURE_AUTH_CLIENT_SECRET
/// and AZURE_TENANT_ID.
#[derive(Debug, Parser)]
#[command(name = "entra-user-check", version, about)]
struct Cli {
    /// Invocation event as a JSON object, e.g. '{"username": "jane@example.com"}'.
    #[arg(long, value_name = "JSON", conflicts_with_all = ["event_file", "username"])]
    event: Option<String>,

    /// Read the invocation event from a file ("-" for stdin).
    #[arg(long, value_name = "PATH", conflicts_with = "username")]
    event_file: Option<PathBuf>,

    /// Shorthand for an event carrying only this username.
    #[arg(long, value_name = "EMAIL")]
    username: Option<String>,

    /// Also print the outcome as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Build the invocation event. No event source at all is an empty event.
    fn invocation_event(&self) -> Result<InvocationEvent, InputError> {
        if let Some(json) = &self.event {
            InvocationEvent::from_json(json)
        } else if let Some(path) = &self.event_file {
            InvocationEvent::from_path(path)
        } else if let Some(username) = &self.username {
            Ok(InvocationEvent::with_username(username.as_str()))
        } else {
            Ok(InvocationEvent::default())
        }
    }
}

fn main() {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            init_logging("info");
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging.level);
    info!("Starting entra-user-check v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli, &config) {
        Ok(outcome) => {
            if cli.json {
                match outcome_json(&outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize outcome: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            if !e.already_logged() {
                error!("{}", e);
            }
            std::process::exit(e.exit_code());
        }
    }
}

/// Initialize tracing/logging on stderr.
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    log_subscriber(filter, std::io::stderr().is_terminal(), std::io::stderr).init();
}

/// Level and message only; colour only when `ansi` is set.
fn log_subscriber<W>(
    filter: EnvFilter,
    ansi: bool,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish()
}

/// Outcome as printed by `--json`.
fn outcome_json(outcome: &CheckOutcome) -> serde_json::Result<String> {
    serde_json::to_string(outcome)
}

/// Build the event and a single-threaded runtime, then run the check.
fn run(cli: &Cli, config: &Config) -> Result<CheckOutcome, AppError> {
    let event = cli.invocation_event()?;

    let runtime = build_runtime().map_err(|e| AppError::Config(format!("{:#}", e)))?;

    runtime.block_on(run_check(config, &event, |key| env::var(key).ok()))
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")
}
