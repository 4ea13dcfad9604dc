//! Per-download progress tracking
//!
//! A `TransferProgress` drives one indicatif bar and, for bodies of known
//! size, emits a textual report every time another `step_percent`
//! percentage points have been received. Textual reports go to the console
//! only when no bar is visible.

use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::debug;

use super::console::Console;
use super::protocol::BodyProgress;

/// Progress of a single body transfer
pub struct TransferProgress {
    label: String,
    total: Option<u64>,
    received: u64,
    step_percent: u8,
    next_milestone: u8,
    bar: ProgressBar,
    console: Option<Arc<Console>>,
}

impl std::fmt::Debug for TransferProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferProgress")
            .field("label", &self.label)
            .field("total", &self.total)
            .field("received", &self.received)
            .finish()
    }
}

impl TransferProgress {
    pub fn new(
        label: &str,
        total: Option<u64>,
        step_percent: u8,
        bar: ProgressBar,
        console: Option<Arc<Console>>,
    ) -> Self {
        let step_percent = step_percent.clamp(1, 100);
        Self {
            label: label.to_string(),
            total,
            received: 0,
            step_percent,
            next_milestone: step_percent,
            bar,
            console,
        }
    }

    /// Completed percentage, when the total is known and non-zero
    pub fn percent(&self) -> Option<u8> {
        match self.total {
            Some(total) if total > 0 => {
                let percent = self.received.min(total) * 100 / total;
                Some(percent as u8)
            }
            _ => None,
        }
    }

    /// Mark the transfer as done and remove the bar.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Leave the bar where it stopped.
    pub fn abandon(&self) {
        self.bar.abandon();
    }

    fn report_milestones(&mut self) {
        let Some(percent) = self.percent() else {
            return;
        };

        let mut crossed = None;
        while self.next_milestone <= 100 && percent >= self.next_milestone {
            crossed = Some(self.next_milestone);
            self.next_milestone = self.next_milestone.saturating_add(self.step_percent);
        }

        if let Some(milestone) = crossed {
            debug!(
                "{}: {}% ({} bytes)",
                self.label, milestone, self.received
            );
            if self.bar.is_hidden() {
                if let Some(console) = &self.console {
                    console.line(format!(
                        "{}: {}% ({}/{} bytes)",
                        self.label,
                        milestone,
                        self.received,
                        self.total.unwrap_or_default()
                    ));
                }
            }
        }
    }
}

impl BodyProgress for TransferProgress {
    fn advance(&mut self, bytes: u64) {
        self.received += bytes;
        self.bar.inc(bytes);
        self.report_milestones();
    }
}
