//! Command-line interface components
//!
//! Argument parsing and the fetch command handler.

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::{exit_code, handle_fetch};
