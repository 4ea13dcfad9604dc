//! Application constants for rawfetch
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

/// HTTP wire protocol constants
pub mod http {
    /// Only scheme accepted on the command line
    pub const SCHEME: &str = "http";

    /// TCP port every request is sent to
    pub const DEFAULT_PORT: u16 = 80;

    /// HTTP version token used in the request line
    pub const VERSION: &str = "HTTP/1.1";

    /// Status code that allows body processing
    pub const STATUS_OK: u16 = 200;

    /// Line terminator
    pub const CRLF: &[u8; 2] = b"\r\n";

    /// Header marking a fixed-length body
    pub const CONTENT_LENGTH: &str = "content-length";

    /// Header marking a chunked body
    pub const TRANSFER_ENCODING_CHUNKED: &str = "transfer-encoding: chunked";

    /// Default upper bound on a single status, header or chunk-size line
    pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

    /// Read buffer for the connection's buffered reader
    pub const READ_BUFFER_SIZE: usize = 8 * 1024;
}

/// File operation constants
pub mod files {
    /// Suffix of files still being written
    pub const PARTIAL_FILE_SUFFIX: &str = ".part";

    /// File name used when a URL has no last path segment
    pub const INDEX_FILE_NAME: &str = "index.html";
}

/// Concurrency limits
pub mod workers {
    /// Maximum number of URLs fetched at the same time; extra URLs are dropped
    pub const MAX_CONCURRENT_FETCHES: usize = 4;
}

/// Progress reporting
pub mod progress {
    /// Percentage points between two progress reports
    pub const DEFAULT_STEP_PERCENT: u8 = 10;

    /// Progress bar template for downloads of known size
    pub const BAR_TEMPLATE: &str =
        "{msg:30!} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({percent}%)";

    /// Spinner template for chunked downloads of unknown size
    pub const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg:30!} {bytes}";
}

/// Configuration file locations
pub mod config {
    /// Project-local configuration file
    pub const LOCAL_CONFIG_FILE: &str = "rawfetch.toml";

    /// Directory under the user config directory
    pub const CONFIG_DIR_NAME: &str = "rawfetch";

    /// File name inside the user config directory
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

/// File extensions recognized in directory listings.
///
/// Matching is a plain substring test, so `report.pdf.old` is still kept.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    // documents
    ".pdf", ".doc", ".docx", ".odt", ".rtf", ".txt", ".md", ".tex", ".epub", ".ps",
    // spreadsheets and presentations
    ".xls", ".xlsx", ".ods", ".csv", ".tsv", ".ppt", ".pptx", ".odp",
    // web
    ".html", ".htm", ".css", ".js", ".json", ".xml", ".rss", ".svg",
    // images
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tif", ".tiff", ".ico", ".webp",
    // audio
    ".mp3", ".wav", ".ogg", ".flac", ".aac", ".m4a", ".mid", ".wma",
    // video
    ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".mpeg", ".mpg",
    // archives
    ".zip", ".tar", ".gz", ".tgz", ".bz2", ".xz", ".7z", ".rar", ".iso",
    // executables and packages
    ".exe", ".msi", ".dmg", ".deb", ".rpm", ".apk", ".jar", ".bin",
    // source code
    ".cpp", ".hpp", ".py", ".java", ".rs", ".pl", ".rb", ".asm",
    // data
    ".dat", ".sql", ".db", ".log",
];

pub use files::{INDEX_FILE_NAME, PARTIAL_FILE_SUFFIX};
pub use http::DEFAULT_PORT;
pub use workers::MAX_CONCURRENT_FETCHES;
