//! HTTP/1.1 response framing
//!
//! Everything in here works on a buffered byte stream and knows nothing about
//! sockets or files: the line reader, status parsing, header scanning and the
//! fixed-length and chunked body decoders.

pub mod body;
pub mod headers;
pub mod line;
pub mod request;
pub mod status;

pub use body::{copy_exact, decode_body, parse_chunk_size, BodyProgress, ChunkedDecoder};
pub use headers::{framing_from_header, read_response_head, scan_headers, Framing, ResponseHead};
pub use line::{read_header_line, read_line};
pub use request::build_request;
pub use status::{parse_status, reason_phrase};
