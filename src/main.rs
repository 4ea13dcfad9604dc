//! rawfetch CLI application
//!
//! Fetches files and directory listings over plain HTTP/1.1.

use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use rawfetch::cli::{handle_fetch, Cli};
use rawfetch::config::AppConfig;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(1);
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Main application logic
async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = AppConfig::load(cli.config.as_deref()).await?;

    init_logging(&cli, &config);
    info!("rawfetch v{} starting", env!("CARGO_PKG_VERSION"));

    let code = handle_fetch(&cli, &config).await.map_err(|e| {
        error!(category = e.category(), "{}", e);
        e
    })?;
    Ok(code)
}

/// Initialize logging from the verbosity flags and the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let log_level = cli.log_level(&config.logging.level);

    let mut filter = EnvFilter::from_default_env();
    match format!("rawfetch={}", log_level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring invalid log level '{}': {}", log_level, e),
    }

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(cli.very_verbose)
        .init();

    if cli.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.verbose {
        info!("Verbose logging enabled");
    }
}
