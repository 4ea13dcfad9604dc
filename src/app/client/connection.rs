//! TCP connection setup and teardown

use std::net::SocketAddr;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{lookup_host, TcpSocket};
use tracing::debug;

use crate::constants::http::READ_BUFFER_SIZE;
use crate::errors::{FetchError, FetchResult};

/// Resolve `host` to the first address returned for `port`.
pub async fn resolve(host: &str, port: u16) -> FetchResult<SocketAddr> {
    // IPv6 literals come out of URLs in brackets
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    let mut addresses = lookup_host((bare, port))
        .await
        .map_err(|source| FetchError::HostResolution {
            host: host.to_string(),
            source: Some(source),
        })?;

    let address = addresses.next().ok_or_else(|| FetchError::HostResolution {
        host: host.to_string(),
        source: None,
    })?;
    debug!("Resolved {} to {}", host, address);
    Ok(address)
}

/// An open TCP connection with a buffered read half
#[derive(Debug)]
pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
}

impl Connection {
    /// Create a socket and connect it to `address`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::SocketCreation` if no socket could be created and
    /// `FetchError::Connect` if the connection attempt failed.
    pub async fn open(address: SocketAddr, nodelay: bool) -> FetchResult<Self> {
        let socket = if address.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(FetchError::SocketCreation)?;

        let stream = socket
            .connect(address)
            .await
            .map_err(|source| FetchError::Connect {
                address: address.to_string(),
                source,
            })?;

        if let Err(e) = stream.set_nodelay(nodelay) {
            debug!("Could not set TCP_NODELAY on {}: {}", address, e);
        }

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, read_half),
            writer: write_half,
            peer: address,
        })
    }

    /// Write the whole request.
    pub async fn send(&mut self, request: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(request).await?;
        self.writer.flush().await
    }

    pub fn reader(&mut self) -> &mut BufReader<OwnedReadHalf> {
        &mut self.reader
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Shut down the write half and release the socket.
    pub async fn close(mut self) {
        if let Err(e) = self.writer.shutdown().await {
            debug!("Shutdown of connection to {} failed: {}", self.peer, e);
        }
    }
}
