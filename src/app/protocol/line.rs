//! CRLF line reading on top of a buffered stream
//!
//! Two flavours are provided. [`read_line`] starts a fresh read cycle and
//! drops any CR or LF bytes that precede the line, which are leftovers from a
//! previous message (the CRLF after a terminal chunk, for example).
//! [`read_header_line`] returns bytes exactly as they arrive so the blank
//! line closing a header block is observable.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::constants::http::CRLF;
use crate::errors::{ProtocolError, ProtocolResult};

/// Read one line, skipping stray CR/LF bytes before it.
///
/// The returned bytes always end with CR LF and never start with CR or LF.
pub async fn read_line<R>(reader: &mut R, max_len: usize) -> ProtocolResult<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    read_crlf_line(reader, max_len, true).await
}

/// Read one line without skipping anything. A blank line comes back as `\r\n`.
pub async fn read_header_line<R>(reader: &mut R, max_len: usize) -> ProtocolResult<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    read_crlf_line(reader, max_len, false).await
}

async fn read_crlf_line<R>(reader: &mut R, max_len: usize, skip_leading: bool) -> ProtocolResult<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Err(ProtocolError::ConnectionClosed {
                bytes_read: line.len(),
            });
        }

        let mut consumed = 0;
        let mut terminated = false;
        for &byte in available {
            consumed += 1;
            if skip_leading && line.is_empty() && (byte == b'\r' || byte == b'\n') {
                continue;
            }
            line.push(byte);
            if line.ends_with(CRLF) {
                terminated = true;
                break;
            }
            if line.len() > max_len {
                break;
            }
        }
        reader.consume(consumed);

        if terminated {
            return Ok(line);
        }
        if line.len() > max_len {
            return Err(ProtocolError::LineTooLong { limit: max_len });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;
    use tokio_test::io::Builder;

    const LIMIT: usize = 1024;

    #[tokio::test]
    async fn test_read_simple_line() {
        let mut input: &[u8] = b"HTTP/1.1 200 OK\r\nrest";
        let line = read_line(&mut input, LIMIT).await.unwrap();
        assert_eq!(line, b"HTTP/1.1 200 OK\r\n");
        assert_eq!(input, b"rest");
    }

    #[tokio::test]
    async fn test_leading_terminators_skipped() {
        let mut input: &[u8] = b"\r\n\n\r1a3\r\n";
        let line = read_line(&mut input, LIMIT).await.unwrap();
        assert_eq!(line, b"1a3\r\n");
    }

    #[tokio::test]
    async fn test_header_line_keeps_blank_line() {
        let mut input: &[u8] = b"\r\nbody";
        let line = read_header_line(&mut input, LIMIT).await.unwrap();
        assert_eq!(line, b"\r\n");
        assert_eq!(input, b"body");
    }

    #[tokio::test]
    async fn test_lone_cr_inside_line_is_kept() {
        let mut input: &[u8] = b"a\rb\nc\r\n";
        let line = read_line(&mut input, LIMIT).await.unwrap();
        assert_eq!(line, b"a\rb\nc\r\n");
    }

    #[tokio::test]
    async fn test_line_split_across_reads() {
        let mock = Builder::new()
            .read(b"Content-Le")
            .read(b"ngth: 12\r")
            .read(b"\n")
            .build();
        let mut reader = BufReader::new(mock);
        let line = read_header_line(&mut reader, LIMIT).await.unwrap();
        assert_eq!(line, b"Content-Length: 12\r\n");
    }

    #[tokio::test]
    async fn test_eof_mid_line() {
        let mut input: &[u8] = b"HTTP/1.1 2";
        let err = read_line(&mut input, LIMIT).await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed { bytes_read: 10 }));
    }

    #[tokio::test]
    async fn test_eof_before_any_byte() {
        let mut input: &[u8] = b"\r\n";
        let err = read_line(&mut input, LIMIT).await.unwrap_err();
        assert!(err.is_closed_before_response());
    }

    #[tokio::test]
    async fn test_line_too_long() {
        let mut input: &[u8] = b"0123456789abcdef\r\n";
        let err = read_line(&mut input, 8).await.unwrap_err();
        assert!(matches!(err, ProtocolError::LineTooLong { limit: 8 }));
    }

    #[tokio::test]
    async fn test_consecutive_lines() {
        let mut input: &[u8] = b"one\r\ntwo\r\n\r\n";
        assert_eq!(read_header_line(&mut input, LIMIT).await.unwrap(), b"one\r\n");
        assert_eq!(read_header_line(&mut input, LIMIT).await.unwrap(), b"two\r\n");
        assert_eq!(read_header_line(&mut input, LIMIT).await.unwrap(), b"\r\n");
        assert!(input.is_empty());
    }
}
