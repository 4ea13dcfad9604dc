//! Command handler for rawfetch
//!
//! Wires configuration, console, cancellation and the fetch pool together
//! and turns the per-URL outcomes into a summary and an exit code.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::args::Cli;
use crate::app::{Console, ExtensionSet, FetchContext, FetchOutcome, FetchPool, SignalHandler};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Fetch every URL given on the command line.
///
/// Returns the process exit code.
///
/// # Errors
///
/// Returns `AppError` when the output directory cannot be created.
pub async fn handle_fetch(cli: &Cli, config: &AppConfig) -> Result<i32> {
    let start_time = Instant::now();

    let output_dir = cli
        .output_dir
        .clone()
        .or_else(|| config.fetch.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    tokio::fs::create_dir_all(&output_dir).await.map_err(|e| {
        AppError::generic(format!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;
    info!("Writing downloads to {}", output_dir.display());

    let console = Arc::new(Console::stdout(
        config.console_config(cli.quiet, cli.no_progress),
    ));
    let extensions = Arc::new(ExtensionSet::new(&config.listing.extra_extensions));
    let cancel = CancellationToken::new();
    let signals = SignalHandler::new(cancel.clone()).setup();

    let ctx = FetchContext {
        client: config.client_config(),
        output_dir,
        console: Arc::clone(&console),
        extensions,
        cancel: cancel.clone(),
    };

    let pool = FetchPool::new(ctx).with_max_concurrent(config.fetch.max_concurrent);
    debug!("Up to {} concurrent fetches", pool.max_concurrent());
    let outcomes = pool.run(cli.urls.clone()).await;

    // Stops the signal task without reporting a cancellation.
    cancel.cancel();
    signals.abort();

    print_summary(&console, &outcomes);
    info!("Finished in {:?}", start_time.elapsed());

    Ok(exit_code(&outcomes))
}

/// A lone URL that failed exits 1; with several URLs failures are only
/// reported.
pub fn exit_code(outcomes: &[FetchOutcome]) -> i32 {
    match outcomes {
        [only] if !only.is_success() => 1,
        _ => 0,
    }
}

fn print_summary(console: &Console, outcomes: &[FetchOutcome]) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(report) => {
                let mut line = format!(
                    "{}: {} file(s), {} bytes",
                    outcome.url, report.files, report.bytes
                );
                if report.failures > 0 {
                    line.push_str(&format!(", {} failed", report.failures));
                }
                console.line(line);
            }
            Err(e) => {
                error!("{} failed: {}", outcome.url, e);
                console.error([format!("{}: {}", outcome.url, e)]);
            }
        }
    }
}
