//! # Oakhurst - Analysis App
//!
//! Binary entry point.
//!
//! ## Usage
//!
//! ```bash
//! oakhurst login --email ana@example.com
//! oakhurst create --description "College Fund" --principal 5000 --interest 0.2 --weeks 52
//! oakhurst results 12
//! oakhurst save 12
//! oakhurst export 12 --format pdf
//! oakhurst manager dashboard --user ana
//! ```
//!
//! Logs go to stderr: `RUST_LOG` sets the filter, `OAKHURST_LOG_FORMAT=json`
//! switches to JSON lines.

use clap::Parser;
use oakhurst::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // OAKHURST_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("OAKHURST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "oakhurst=debug,oakhurst_core=debug"
    } else {
        "oakhurst=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::debug!("command failed: {e:?}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
