// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voxlink - an LLM-driven voice call bridge.
//!
//! This is the binary entry point. `serve` runs the webhook ingress and
//! broker relay; `call` places an outbound call and watches its status;
//! `dashboard` subscribes to the relay and renders the message history.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod call;
mod dashboard;
mod serve;
mod shutdown;

/// Voxlink - an LLM-driven voice call bridge.
#[derive(Parser, Debug)]
#[command(name = "voxlink", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook ingress and broker relay.
    Serve,
    /// Place an outbound call and watch its status until it ends.
    Call {
        /// Destination number in E.164 format (e.g. +15551234567).
        to: String,
    },
    /// Subscribe to the relay and render incoming events.
    Dashboard,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match voxlink_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            voxlink_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Call { to }) => call::run_call(config, &to).await,
        Some(Commands::Dashboard) => dashboard::run_dashboard(config).await,
        None => {
            println!("voxlink: use --help for available commands");
            return;
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "voxlink exited with an error");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Installs the tracing subscriber, honoring `RUST_LOG` over the configured
/// level.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
