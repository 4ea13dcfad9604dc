//! Response head parsing: status line, header block and body framing

use tokio::io::AsyncBufRead;
use tracing::trace;

use super::line::{read_header_line, read_line};
use super::status::parse_status;
use crate::constants::http::{CONTENT_LENGTH, CRLF, TRANSFER_ENCODING_CHUNKED};
use crate::errors::{ProtocolError, ProtocolResult};

/// How the body of a response is delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `Content-Length: n`
    FixedLength(u64),
    /// `Transfer-Encoding: chunked`
    Chunked,
    /// Neither header was present; treated as an empty body
    Unspecified,
}

impl Framing {
    /// Body size when it is known up front
    pub fn known_length(&self) -> Option<u64> {
        match self {
            Framing::FixedLength(n) => Some(*n),
            Framing::Chunked | Framing::Unspecified => None,
        }
    }
}

/// Status line plus headers of one response
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: u16,
    pub status_line: String,
    pub headers: Vec<String>,
    pub framing: Framing,
}

/// Read the status line and the complete header block.
///
/// The reader is left positioned at the first body byte.
pub async fn read_response_head<R>(reader: &mut R, max_line: usize) -> ProtocolResult<ResponseHead>
where
    R: AsyncBufRead + Unpin,
{
    let status_line = read_line(reader, max_line).await?;
    let status = parse_status(&status_line)?;
    let (headers, framing) = scan_headers(reader, max_line).await?;

    Ok(ResponseHead {
        status,
        status_line: String::from_utf8_lossy(&status_line).trim_end().to_string(),
        headers,
        framing,
    })
}

/// Consume header lines up to and including the blank line.
///
/// The first framing header wins; later ones are still consumed and returned
/// but do not change the framing.
pub async fn scan_headers<R>(reader: &mut R, max_line: usize) -> ProtocolResult<(Vec<String>, Framing)>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = Vec::new();
    let mut framing = None;

    loop {
        let line = read_header_line(reader, max_line).await?;
        if line.as_slice() == CRLF {
            break;
        }

        let text = String::from_utf8_lossy(&line).into_owned();
        if framing.is_none() {
            framing = framing_from_header(&text)?;
        }
        trace!("Header: {}", text.trim_end());
        headers.push(text);
    }

    Ok((headers, framing.unwrap_or(Framing::Unspecified)))
}

/// Framing announced by a single header line, if any
pub fn framing_from_header(line: &str) -> ProtocolResult<Option<Framing>> {
    let lowered = line.to_ascii_lowercase();

    if lowered.contains(CONTENT_LENGTH) {
        return parse_content_length(line).map(|n| Some(Framing::FixedLength(n)));
    }

    if lowered.contains(TRANSFER_ENCODING_CHUNKED) {
        return Ok(Some(Framing::Chunked));
    }

    Ok(None)
}

/// Concatenate the decimal digits of the header value.
fn parse_content_length(line: &str) -> ProtocolResult<u64> {
    let invalid = || ProtocolError::InvalidContentLength {
        line: line.trim_end().to_string(),
    };

    let value = line.split_once(':').map(|(_, v)| v).ok_or_else(invalid)?;
    let mut digits = value.chars().filter(char::is_ascii_digit).peekable();
    if digits.peek().is_none() {
        return Err(invalid());
    }

    digits.try_fold(0u64, |n, d| {
        n.checked_mul(10)
            .and_then(|n| n.checked_add(u64::from(d as u8 - b'0')))
            .ok_or_else(invalid)
    })
}
