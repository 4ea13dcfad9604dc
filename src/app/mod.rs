//! Core application logic for rawfetch
//!
//! This module contains the HTTP wire protocol, the raw-socket client,
//! listing extraction, storage, console output and the fetch pool.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rawfetch::app::{ClientConfig, Console, ConsoleConfig, ExtensionSet, FetchContext, FetchPool};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let ctx = FetchContext {
//!     client: ClientConfig::default(),
//!     output_dir: ".".into(),
//!     console: Arc::new(Console::stdout(ConsoleConfig::default())),
//!     extensions: Arc::new(ExtensionSet::default()),
//!     cancel: CancellationToken::new(),
//! };
//!
//! let outcomes = FetchPool::new(ctx)
//!     .run(vec!["http://example.com/files/".to_string()])
//!     .await;
//! for outcome in outcomes {
//!     println!("{}: {}", outcome.url, outcome.is_success());
//! }
//! # }
//! ```

pub mod client;
pub mod console;
pub mod listing;
pub mod pool;
pub mod progress;
pub mod protocol;
pub mod signals;
pub mod storage;
pub mod target;

// Re-export main public API
pub use client::{process_address, ClientConfig, FetchContext, FetchReport, Session};
pub use console::{Console, ConsoleConfig};
pub use listing::{extract_links, ExtensionSet};
pub use pool::{FetchOutcome, FetchPool};
pub use progress::TransferProgress;
pub use signals::SignalHandler;
pub use target::Target;
