//! Raw-socket HTTP client
//!
//! The module is organized into specialized components:
//! - `config`: connection and parsing settings
//! - `connection`: address resolution and TCP sockets
//! - `session`: request/response exchange with reconnect-and-resend
//! - `download`: file downloads and folder crawls

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::app::console::Console;
use crate::app::listing::ExtensionSet;
use crate::app::target::Target;
use crate::errors::FetchResult;

pub mod config;
pub mod connection;
pub mod download;
pub mod session;

pub use config::ClientConfig;
pub use download::FetchReport;
pub use session::Session;

/// Everything a fetch needs besides its URL
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub client: ClientConfig,
    pub output_dir: PathBuf,
    pub console: Arc<Console>,
    pub extensions: Arc<ExtensionSet>,
    pub cancel: CancellationToken,
}

/// Fetch one URL: a single file, or every file of a folder listing.
///
/// The connection is opened once and reused for every request of this URL.
///
/// # Errors
///
/// Returns a `FetchError` when the URL is invalid, the host cannot be
/// reached, or the top-level request fails. Failures of individual files in
/// a folder are counted in the report instead.
#[instrument(skip(ctx))]
pub async fn process_address(url: &str, ctx: &FetchContext) -> FetchResult<FetchReport> {
    let target = Target::parse(url)?;
    let mut session = Session::connect(target.host(), &ctx.client, ctx.cancel.clone()).await?;

    ctx.console.block([
        "Connection successfully established.".to_string(),
        format!("Host name: {}", target.host()),
        format!("Host IP: {}", session.peer().ip()),
    ]);

    let result = if target.is_folder() {
        download::crawl_folder(&mut session, &target, ctx).await
    } else {
        download::fetch_single(&mut session, &target, ctx).await
    };

    info!(
        "Finished {} after {} reconnects",
        target,
        session.reconnects()
    );
    session.close().await;
    result
}
