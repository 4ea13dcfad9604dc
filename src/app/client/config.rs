//! Client configuration
//!
//! Runtime settings for connections and response parsing. The port is only
//! adjustable through the library API; the command line always uses port 80.

use crate::constants::http;

/// Configuration for raw HTTP connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// TCP port requests are sent to
    pub port: u16,
    /// Upper bound on a single status, header or chunk-size line
    pub max_line_length: usize,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            port: http::DEFAULT_PORT,
            max_line_length: http::DEFAULT_MAX_LINE_LENGTH,
            tcp_nodelay: true,
        }
    }
}
