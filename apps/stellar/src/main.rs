//! # Stellar - Life Cycle Viewer
//!
//! The main binary for the stellar life cycle engine.
//!
//! This application provides:
//! - A headless fixed-step loop with scripted input
//! - Text and JSON-lines presenters
//! - Catalog inspection and validation commands
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  apps/stellar (THE BINARY)                  │
//! │                                                             │
//! │  ┌───────────┐    ┌─────────────┐    ┌──────────────────┐   │
//! │  │   CLI     │    │  Game Loop  │    │    Presenters    │   │
//! │  │  (clap)   │    │  + Script   │    │  (text / json)   │   │
//! │  └─────┬─────┘    └──────┬──────┘    └────────┬─────────┘   │
//! │        │                 │                    │             │
//! │        └─────────────────┼────────────────────┘             │
//! │                          ▼                                  │
//! │                  ┌───────────────┐                          │
//! │                  │ stellar-core  │                          │
//! │                  │  (THE ENGINE) │                          │
//! │                  └───────────────┘                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Ten simulated seconds of a sun-like star
//! stellar run --mass 1.0 --frames 600
//!
//! # Push a star across the Low/Medium boundary at frame 120
//! stellar run --mass 1.95 --event 120:mass-up --format json
//!
//! # Inspect the catalog
//! stellar ranges
//! stellar schedule --mass 12
//! ```

use clap::Parser;
use stellar::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing - STELLAR_LOG_FORMAT=json enables machine-parseable output.
    // Logs go to stderr; stdout carries frame output.
    let log_format = std::env::var("STELLAR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "stellar=debug,stellar_core=debug"
    } else {
        "stellar=info,stellar_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    eprintln!(
        r#"
     *        .            *
        .   ___ _____ ___ _    _      _   ___
   *       / __|_   _| __| |  | |    /_\ | _ \
      .    \__ \ | | | _|| |__| |__ / _ \|   /
           |___/ |_| |___|____|____/_/ \_\_|_\
   .    *
  Stellar Life Cycle Viewer v{}

  Nebula • Main Sequence • Remnant
"#,
        env!("CARGO_PKG_VERSION")
    );
}
