//! GET request rendering

use crate::constants::http::VERSION;

/// Render the request sent for `path` on `host`.
pub fn build_request(host: &str, path: &str) -> String {
    format!(
        "GET {} {}\r\nHost: {}\r\nConnection: keep-alive\r\n\r\n",
        path, VERSION, host
    )
}
