//! rawfetch library
//!
//! A minimal HTTP/1.1 GET client over raw TCP sockets. Downloads single files
//! or every file linked from a directory listing, several URLs at a time.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
