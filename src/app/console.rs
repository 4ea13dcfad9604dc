//! Shared console output
//!
//! Concurrent fetches report through one `Console`. Each call writes a whole
//! block of lines while holding the console lock, so blocks from different
//! tasks never interleave. On an interactive terminal, progress bars are
//! drawn by a `MultiProgress` and suspended while text is written.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::debug;

use super::progress::TransferProgress;
use crate::constants::progress::{BAR_TEMPLATE, DEFAULT_STEP_PERCENT, SPINNER_TEMPLATE};

/// Console behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct ConsoleConfig {
    /// Draw progress bars when stderr is a terminal
    pub progress_bars: bool,
    /// Suppress everything except errors
    pub quiet: bool,
    /// Percentage points between textual progress reports
    pub step_percent: u8,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            progress_bars: true,
            quiet: false,
            step_percent: DEFAULT_STEP_PERCENT,
        }
    }
}

/// Mutex-serialized output sink shared by all fetch tasks
pub struct Console {
    out: Mutex<Box<dyn Write + Send>>,
    bars: Option<MultiProgress>,
    config: ConsoleConfig,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("bars", &self.bars.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Console {
    /// Console on stdout; bars are only drawn when stderr is a terminal
    pub fn stdout(config: ConsoleConfig) -> Self {
        let interactive = atty::is(atty::Stream::Stderr);
        let bars = (config.progress_bars && interactive && !config.quiet)
            .then(|| MultiProgress::with_draw_target(ProgressDrawTarget::stderr()));
        debug!(
            "Console initialized (interactive: {}, progress bars: {})",
            interactive,
            bars.is_some()
        );

        Self {
            out: Mutex::new(Box::new(io::stdout())),
            bars,
            config,
        }
    }

    /// Console writing to an arbitrary sink, without progress bars
    pub fn with_writer(writer: Box<dyn Write + Send>, config: ConsoleConfig) -> Self {
        Self {
            out: Mutex::new(writer),
            bars: None,
            config,
        }
    }

    /// Write several lines as one uninterrupted block.
    pub fn block<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.config.quiet {
            self.write_block(lines);
        }
    }

    /// Write a single line.
    pub fn line(&self, line: impl AsRef<str>) {
        self.block([line]);
    }

    /// Write a block that is shown even in quiet mode.
    pub fn error<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.write_block(lines);
    }

    fn write_block<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let write_all = || {
            for line in lines {
                let _ = writeln!(out, "{}", line.as_ref());
            }
            let _ = out.flush();
        };

        match &self.bars {
            Some(bars) => bars.suspend(write_all),
            None => write_all(),
        }
    }

    /// Start progress reporting for one download.
    pub fn transfer(self: &Arc<Self>, label: &str, total: Option<u64>) -> TransferProgress {
        let bar = match &self.bars {
            Some(bars) => {
                let bar = match total {
                    Some(total) => ProgressBar::new(total).with_style(bar_style(BAR_TEMPLATE)),
                    None => ProgressBar::new_spinner().with_style(bar_style(SPINNER_TEMPLATE)),
                };
                bars.add(bar.with_message(label.to_string()))
            }
            None => ProgressBar::hidden(),
        };

        TransferProgress::new(
            label,
            total,
            self.config.step_percent,
            bar,
            Some(Arc::clone(self)),
        )
    }
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}
