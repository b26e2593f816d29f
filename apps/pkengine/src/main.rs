//! pkengine - package transaction engine front end
//!
//! Parses one command, runs it as a single transaction and prints the
//! transaction's event stream until it finishes.

mod cli;
mod error;
mod events;

use crate::cli::{Cli, GlobalArgs};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use pkengine_config::Config;
use pkengine_events::{EventReceiver, ExitKind};
use pkengine_ops::{CancelRequest, EngineBuilder, TerminalState, TransactionHandle};
use pkengine_store::MemoryStore;
use pkengine_types::OutputFormat;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.output_format() == Some(OutputFormat::Json);

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Application error: {}", e);
            eprintln!("Error: {e}");
            process::exit(2);
        }
    }
}

/// Main application logic, returning the process exit code
async fn run(cli: Cli) -> Result<i32, CliError> {
    info!("Starting pkengine v{}", env!("CARGO_PKG_VERSION"));

    // 1. File config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Environment variables
    config.merge_env()?;

    // 3. CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global);

    let format = cli
        .global
        .output_format()
        .unwrap_or(config.general.default_output);

    let store = match &cli.global.catalog {
        Some(path) => MemoryStore::load(path).await?,
        None => MemoryStore::sample()?,
    };

    let (event_sender, event_receiver) = pkengine_events::channel();
    let engine = EngineBuilder::new()
        .with_store(Arc::new(store))
        .with_config(config)
        .with_event_sender(event_sender)
        .build()?;

    let operation = cli.command.into_operation();
    info!(operation = %operation, "starting transaction");
    let (handle, join) = engine.start(operation)?;

    spawn_cancel_triggers(&handle, cli.global.cancel_after);

    let handler = EventHandler::new(format, cli.global.debug);
    let exit = stream_events(event_receiver, &handler).await;

    let outcome = join.await?;
    info!(
        transaction = %outcome.transaction_id,
        terminal = ?outcome.terminal,
        "transaction complete"
    );
    if exit.is_none() {
        warn!("event stream closed before the transaction finished");
    }

    Ok(match outcome.terminal {
        TerminalState::Finished => 0,
        TerminalState::Errored => 1,
        TerminalState::Cancelled => 130,
    })
}

/// Apply CLI flags over file and environment configuration
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    if global.offline {
        config.general.network_online = false;
    }
    if let Some(locale) = &global.locale {
        config.general.locale.clone_from(locale);
    }
}

/// Print events until the transaction reports `finished`
async fn stream_events(mut receiver: EventReceiver, handler: &EventHandler) -> Option<ExitKind> {
    while let Some(message) = receiver.recv().await {
        if let Some(exit) = handler.handle_event(&message) {
            return Some(exit);
        }
    }
    None
}

/// Cancel on Ctrl-C, and after `--cancel-after` when given
fn spawn_cancel_triggers(handle: &TransactionHandle, cancel_after: Option<u64>) {
    let on_signal = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            report_cancel(on_signal.cancel());
        }
    });

    if let Some(ms) = cancel_after {
        let on_timer = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            report_cancel(on_timer.cancel());
        });
    }
}

fn report_cancel(request: CancelRequest) {
    match request {
        CancelRequest::Accepted => info!("cancellation accepted"),
        CancelRequest::Queued => info!("cancellation queued until the transaction allows it"),
        CancelRequest::AlreadyFinished => {}
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,pkengine=debug,pkengine_ops=debug")
        })
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file, keeping stdout clean
        if let Some(file) = open_log_file() {
            tracing_subscriber::fmt()
                .json()
                .with_writer(file)
                .with_env_filter(filter())
                .init();
            return;
        }
    }

    if json_mode {
        // Nothing on the console may contaminate the JSON event stream
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter("warn")
            .with_target(false)
            .without_time()
            .init();
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let log_dir = dirs::data_local_dir()?.join("pkengine").join("logs");
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {e}");
        return None;
    }

    let log_file = log_dir.join(format!(
        "pkengine-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    match std::fs::File::create(&log_file) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {e}");
            None
        }
    }
}
