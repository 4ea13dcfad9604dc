//! Request/response exchange with reconnect-and-resend
//!
//! A `Session` owns the connection to one host for the whole lifetime of a
//! `process_address` call. When sending a request fails, or the peer closed a
//! kept-alive connection before answering, the session reconnects and sends
//! the same request again. It retries without delay or limit until the
//! request goes through or the cancellation token is set; the token is
//! checked once per attempt.

use std::net::SocketAddr;

use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::ClientConfig;
use super::connection::{resolve, Connection};
use crate::app::protocol::{
    build_request, decode_body, read_response_head, reason_phrase, BodyProgress, Framing,
    ResponseHead,
};
use crate::constants::http::STATUS_OK;
use crate::errors::{FetchError, FetchResult, ProtocolError};

/// Connection lifecycle and retry driver for one host
#[derive(Debug)]
pub struct Session {
    host: String,
    address: SocketAddr,
    config: ClientConfig,
    cancel: CancellationToken,
    connection: Option<Connection>,
    reconnects: u64,
}

impl Session {
    /// Resolve `host` and open the first connection.
    ///
    /// Failures here are final; only later connection losses are retried.
    pub async fn connect(
        host: &str,
        config: &ClientConfig,
        cancel: CancellationToken,
    ) -> FetchResult<Self> {
        let address = resolve(host, config.port).await?;
        let connection = Connection::open(address, config.tcp_nodelay).await?;
        info!("Connected to {} ({})", host, address);

        Ok(Self {
            host: host.to_string(),
            address,
            config: config.clone(),
            cancel,
            connection: Some(connection),
            reconnects: 0,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.address
    }

    /// Connection attempts made by the retry loop so far
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Send a GET for `path` and read the response head.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::NonSuccessStatus` for anything but 200,
    /// `FetchError::Cancelled` if the user cancelled while retrying, or the
    /// protocol error that stopped the head from being parsed.
    pub async fn request(&mut self, path: &str) -> FetchResult<ResponseHead> {
        let request = build_request(&self.host, path);
        debug!("GET http://{}{}", self.host, path);

        let head = self.exchange(request.as_bytes()).await?;
        debug!("{} -> {}", path, head.status_line);
        for header in &head.headers {
            debug!("  {}", header.trim_end());
        }

        if head.status != STATUS_OK {
            // The unread body would corrupt the next exchange.
            self.discard().await;
            return Err(FetchError::NonSuccessStatus {
                status: head.status,
                reason: reason_phrase(head.status),
            });
        }

        Ok(head)
    }

    /// Decode the body announced by `head` into `sink`.
    pub async fn read_body<W, P>(
        &mut self,
        head: &ResponseHead,
        sink: &mut W,
        progress: &mut P,
    ) -> FetchResult<u64>
    where
        W: AsyncWrite + Unpin,
        P: BodyProgress,
    {
        let max_line = self.config.max_line_length;
        let connection = self
            .connection
            .as_mut()
            .ok_or(FetchError::Protocol(ProtocolError::ConnectionClosed { bytes_read: 0 }))?;

        let result = decode_body(connection.reader(), sink, head.framing, max_line, progress).await;

        match result {
            Ok(written) => {
                if head.framing == Framing::Unspecified {
                    // Without framing the end of this response is unknown.
                    self.discard().await;
                }
                Ok(written)
            }
            Err(e) => {
                self.discard().await;
                Err(e.into())
            }
        }
    }

    /// Close the current connection; the next request reconnects.
    pub async fn discard(&mut self) {
        if let Some(connection) = self.connection.take() {
            debug!("Discarding connection to {}", connection.peer());
            connection.close().await;
        }
    }

    /// Close the session and its connection.
    pub async fn close(mut self) {
        self.discard().await;
    }

    async fn exchange(&mut self, request: &[u8]) -> FetchResult<ResponseHead> {
        let max_line = self.config.max_line_length;

        loop {
            if self.connection.is_none() {
                self.reconnect().await?;
            }
            let Some(connection) = self.connection.as_mut() else {
                continue;
            };

            match connection.send(request).await {
                Ok(()) => match read_response_head(connection.reader(), max_line).await {
                    Ok(head) => return Ok(head),
                    Err(e) if e.is_closed_before_response() || e.is_connection_reset() => {
                        warn!("Connection to {} lost before a response: {}", self.address, e);
                    }
                    Err(e) => {
                        self.discard().await;
                        return Err(e.into());
                    }
                },
                Err(e) => {
                    let error = FetchError::Send(e);
                    warn!("{} on {}; reconnecting", error, self.address);
                }
            }

            self.discard().await;
            self.reconnect().await?;
        }
    }

    /// Reconnect until it works or the user cancels.
    async fn reconnect(&mut self) -> FetchResult<()> {
        self.discard().await;

        loop {
            if self.cancel.is_cancelled() {
                info!("Retrying {} cancelled", self.host);
                return Err(FetchError::Cancelled);
            }

            self.reconnects += 1;
            match Connection::open(self.address, self.config.tcp_nodelay).await {
                Ok(connection) => {
                    debug!(
                        "Reconnected to {} (attempt {})",
                        self.address, self.reconnects
                    );
                    self.connection = Some(connection);
                    return Ok(());
                }
                Err(e) => {
                    debug!("Reconnect attempt {} failed: {}", self.reconnects, e);
                    tokio::task::yield_now().await;
                }
            }
        }
    }
}
