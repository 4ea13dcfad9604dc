//! Body decoding for fixed-length and chunked responses
//!
//! Both decoders consume exactly the bytes that belong to the body from the
//! buffered reader, so the same connection can carry the next response.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use super::headers::Framing;
use super::line::read_line;
use crate::constants::http::CRLF;
use crate::errors::{ProtocolError, ProtocolResult};

/// Receives the number of body bytes written to the sink after every write
pub trait BodyProgress {
    fn advance(&mut self, bytes: u64);
}

impl BodyProgress for () {
    fn advance(&mut self, _bytes: u64) {}
}

/// Decode a body according to its framing, returning the bytes written.
pub async fn decode_body<R, W, P>(
    reader: &mut R,
    sink: &mut W,
    framing: Framing,
    max_line: usize,
    progress: &mut P,
) -> ProtocolResult<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    P: BodyProgress,
{
    let written = match framing {
        Framing::FixedLength(length) => copy_exact(reader, sink, length, progress).await?,
        Framing::Chunked => {
            ChunkedDecoder::new(max_line)
                .decode(reader, sink, progress)
                .await?
        }
        Framing::Unspecified => 0,
    };
    sink.flush().await?;
    Ok(written)
}

/// Copy exactly `length` bytes from `reader` to `sink`.
pub async fn copy_exact<R, W, P>(
    reader: &mut R,
    sink: &mut W,
    length: u64,
    progress: &mut P,
) -> ProtocolResult<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    P: BodyProgress,
{
    let mut received = 0u64;

    while received < length {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Err(ProtocolError::IncompleteBody {
                expected: length,
                received,
            });
        }

        let remaining = length - received;
        let take = usize::try_from(remaining)
            .map_or(available.len(), |r| r.min(available.len()));
        sink.write_all(&available[..take]).await?;
        reader.consume(take);

        received += take as u64;
        progress.advance(take as u64);
    }

    Ok(received)
}

/// States of the chunked transfer decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    AwaitChunkSizeLine,
    ReadChunkBody { size: u64 },
    AwaitTrailingCrlf,
    Terminal,
}

/// Chunked transfer-encoding decoder.
///
/// Trailer headers after the terminal chunk are not consumed.
#[derive(Debug)]
pub struct ChunkedDecoder {
    state: ChunkState,
    max_line: usize,
    chunks: u64,
}

impl ChunkedDecoder {
    pub fn new(max_line: usize) -> Self {
        Self {
            state: ChunkState::AwaitChunkSizeLine,
            max_line,
            chunks: 0,
        }
    }

    /// Run the state machine until the terminal chunk.
    pub async fn decode<R, W, P>(
        &mut self,
        reader: &mut R,
        sink: &mut W,
        progress: &mut P,
    ) -> ProtocolResult<u64>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        P: BodyProgress,
    {
        let mut written = 0u64;

        loop {
            self.state = match self.state {
                ChunkState::AwaitChunkSizeLine => {
                    let line = read_line(reader, self.max_line).await?;
                    let size = parse_chunk_size(&line)?;
                    trace!("Chunk size line {:?} -> {}", String::from_utf8_lossy(&line), size);
                    if size == 0 {
                        ChunkState::Terminal
                    } else {
                        ChunkState::ReadChunkBody { size }
                    }
                }
                ChunkState::ReadChunkBody { size } => {
                    written += copy_exact(reader, sink, size, progress).await?;
                    self.chunks += 1;
                    ChunkState::AwaitTrailingCrlf
                }
                ChunkState::AwaitTrailingCrlf => {
                    let mut trailer = [0u8; 2];
                    let read = read_up_to(reader, &mut trailer).await?;
                    if &trailer[..read] != CRLF {
                        return Err(ProtocolError::ChunkFraming {
                            found: trailer[..read].to_vec(),
                        });
                    }
                    ChunkState::AwaitChunkSizeLine
                }
                ChunkState::Terminal => {
                    debug!("Chunked body complete: {} chunks, {} bytes", self.chunks, written);
                    return Ok(written);
                }
            };
        }
    }
}

/// Fill `buf` unless the stream ends first; returns the bytes read.
async fn read_up_to<R>(reader: &mut R, buf: &mut [u8]) -> ProtocolResult<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Parse a chunk-size line such as `1a3\r\n` or `1A3;name=value\r\n`.
///
/// Chunk extensions after `;` and surrounding whitespace are ignored; any
/// other non-hex character rejects the line.
pub fn parse_chunk_size(line: &[u8]) -> ProtocolResult<u64> {
    let invalid = || ProtocolError::InvalidChunkSize {
        line: String::from_utf8_lossy(line).trim_end().to_string(),
    };

    let size_part = line.split(|&b| b == b';').next().unwrap_or_default();
    let digits = std::str::from_utf8(size_part)
        .map_err(|_| invalid())?
        .trim();
    if digits.is_empty() {
        return Err(invalid());
    }

    digits.chars().try_fold(0u64, |size, c| {
        let digit = c.to_digit(16).ok_or_else(invalid)?;
        size.checked_mul(16)
            .and_then(|s| s.checked_add(u64::from(digit)))
            .ok_or_else(invalid)
    })
}
