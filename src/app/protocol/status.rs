//! Status line parsing and reason phrases

use crate::errors::{ProtocolError, ProtocolResult};

/// Extract the three-digit status code from a response status line.
///
/// The line must look like `HTTP/<version> <ddd>[ <reason>]\r\n`.
pub fn parse_status(line: &[u8]) -> ProtocolResult<u16> {
    let malformed = || ProtocolError::MalformedStatusLine {
        line: String::from_utf8_lossy(line).trim_end().to_string(),
    };

    if !line.starts_with(b"HTTP/") {
        return Err(malformed());
    }

    let space = line.iter().position(|&b| b == b' ').ok_or_else(malformed)?;
    let digits = line.get(space + 1..space + 4).ok_or_else(malformed)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(malformed());
    }

    match line.get(space + 4) {
        None | Some(b' ') | Some(b'\r') => {}
        Some(_) => return Err(malformed()),
    }

    Ok(digits
        .iter()
        .fold(0u16, |code, digit| code * 10 + u16::from(digit - b'0')))
}

/// Standard reason phrase for a status code, `"Unknown"` if unregistered
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Content Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        421 => "Misdirected Request",
        422 => "Unprocessable Content",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        _ => "Unknown",
    }
}
