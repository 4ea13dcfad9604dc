//! Command-line argument parsing for rawfetch
//!
//! This module defines the CLI structure using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// rawfetch - fetch files over plain HTTP/1.1
#[derive(Parser, Debug)]
#[command(
    name = "rawfetch",
    version,
    about = "Download files or whole directory listings over plain HTTP",
    long_about = "A minimal HTTP/1.1 GET client speaking directly over TCP port 80.
URLs ending in '/' are treated as directory listings: every linked file with a
known extension is downloaded into a folder named after the listing.
Up to 4 URLs are fetched concurrently; further URLs are ignored."
)]
pub struct Cli {
    /// URLs to fetch (http:// only)
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Directory downloads are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - only errors are printed
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Log level chosen by the verbosity flags, if any was given
    pub fn flag_log_level(&self) -> Option<tracing::Level> {
        if self.quiet {
            Some(tracing::Level::ERROR)
        } else if self.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }

    /// Effective log level: flags win over the configured level.
    pub fn log_level(&self, configured: &str) -> String {
        match self.flag_log_level() {
            Some(level) => level.to_string().to_lowercase(),
            None => configured.to_lowercase(),
        }
    }
}
