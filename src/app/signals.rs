//! Signal handling for cancellation
//!
//! The first Ctrl-C (or SIGTERM on Unix) cancels the shared token. Fetches
//! observe it only while retrying a request, so a transfer that is making
//! progress keeps running; a second signal exits the process with status 130.

use std::future::Future;

use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Exit status after an interrupt
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Cancels a token when the process is asked to stop
#[derive(Debug, Clone)]
pub struct SignalHandler {
    cancel: CancellationToken,
}

impl SignalHandler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Spawn the background task that waits for signals.
    pub fn setup(&self) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        tokio::spawn(escalate(cancel, wait_for_interrupt, || {
            std::process::exit(INTERRUPTED_EXIT_CODE)
        }))
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Cancel on the first signal from `next_signal` and call `abort` on the
/// second. Returns early if the token is cancelled elsewhere first.
async fn escalate<S, F, A>(cancel: CancellationToken, mut next_signal: S, abort: A)
where
    S: FnMut() -> F,
    F: Future<Output = ()>,
    A: FnOnce(),
{
    tokio::select! {
        _ = next_signal() => {},
        _ = cancel.cancelled() => return,
    }

    info!("Cancelling pending retries");
    cancel.cancel();
    warn!("Interrupt received; press Ctrl+C again to quit immediately");

    next_signal().await;
    warn!("Second interrupt received, exiting");
    abort();
}

/// Wait for Ctrl-C or SIGTERM. A handler that cannot be installed never fires.
async fn wait_for_interrupt() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C signal received"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("SIGTERM signal received");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
