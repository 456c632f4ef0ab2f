// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Faff - direct messaging with realtime presence and semantic search.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod backfill;
mod serve;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use faff_config::FaffConfig;

/// Faff - direct messaging with realtime presence and semantic search.
#[derive(Parser, Debug)]
#[command(name = "faff", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API and realtime gateway.
    Serve,
    /// Embed stored messages that have no vector yet, then exit.
    Backfill {
        /// Rows per batch (overrides `backfill.batch_size`).
        #[arg(long)]
        batch_size: Option<usize>,
        /// Delay after each row in milliseconds (overrides `backfill.sleep_ms`).
        #[arg(long)]
        sleep_ms: Option<u64>,
    },
}

fn load_config(path: Option<&std::path::Path>) -> Option<FaffConfig> {
    let loaded = match path {
        Some(path) => faff_config::load_and_validate_path(path),
        None => faff_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(errors) => {
            faff_config::render_errors(&errors);
            None
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("faff={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(mut config) = load_config(cli.config.as_deref()) else {
        return ExitCode::FAILURE;
    };
    init_tracing(&config.log.level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Backfill {
            batch_size,
            sleep_ms,
        }) => {
            if let Some(batch_size) = batch_size {
                config.backfill.batch_size = batch_size.max(1);
            }
            if let Some(sleep_ms) = sleep_ms {
                config.backfill.sleep_ms = sleep_ms;
            }
            backfill::run_backfill(config).await
        }
        None => {
            println!("faff: use --help for available commands");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "faff exited with an error");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
