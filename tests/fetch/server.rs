//! Scripted HTTP/1.1 server for integration tests
//!
//! Answers every request on a connection from a fixed route table and keeps
//! the connection open unless told otherwise.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};

/// Canned response for one path
#[derive(Clone)]
pub enum Reply {
    Fixed(Vec<u8>),
    Chunked(Vec<&'static str>),
    Status(u16, &'static str),
    /// Bytes written verbatim, for malformed responses
    Raw(Vec<u8>),
    /// Fixed-length reply whose body follows the head after a pause
    Slow(Vec<u8>, Duration),
}

impl Reply {
    fn render(&self) -> Vec<u8> {
        match self {
            Reply::Fixed(body) => {
                let mut out =
                    format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", body.len()).into_bytes();
                out.extend_from_slice(body);
                out
            }
            Reply::Chunked(chunks) => {
                let mut out = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
                for chunk in chunks {
                    out.extend_from_slice(format!("{:x}\r\n{}\r\n", chunk.len(), chunk).as_bytes());
                }
                out.extend_from_slice(b"0\r\n\r\n");
                out
            }
            Reply::Status(status, reason) => format!(
                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n\r\n{}",
                status,
                reason,
                reason.len(),
                reason
            )
            .into_bytes(),
            Reply::Raw(bytes) => bytes.clone(),
            Reply::Slow(body, _) => Reply::Fixed(body.clone()).render(),
        }
    }

    /// Write the reply, pausing between head and body for `Slow`.
    async fn send(&self, writer: &mut OwnedWriteHalf) -> std::io::Result<()> {
        let bytes = self.render();
        match self {
            Reply::Slow(body, pause) => {
                let head_len = bytes.len() - body.len();
                writer.write_all(&bytes[..head_len]).await?;
                writer.flush().await?;
                tokio::time::sleep(*pause).await;
                writer.write_all(&bytes[head_len..]).await
            }
            _ => writer.write_all(&bytes).await,
        }
    }
}

/// Running test server
pub struct TestServer {
    pub address: SocketAddr,
    connections: Arc<AtomicUsize>,
    requests: Arc<AtomicUsize>,
}

impl TestServer {
    /// Serve `routes`; with `close_after_each` every connection answers a
    /// single request and is then closed.
    pub async fn start(routes: Vec<(&str, Reply)>, close_after_each: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let routes: Arc<HashMap<String, Reply>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, reply)| (path.to_string(), reply))
                .collect(),
        );
        let connections = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(AtomicUsize::new(0));

        let accepted = Arc::clone(&connections);
        let served = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                accepted.fetch_add(1, Ordering::SeqCst);
                let routes = Arc::clone(&routes);
                let served = Arc::clone(&served);
                tokio::spawn(serve(socket, routes, served, close_after_each));
            }
        });

        Self {
            address,
            connections,
            requests,
        }
    }

    pub fn port(&self) -> u16 {
        self.address.port()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn serve(
    socket: TcpStream,
    routes: Arc<HashMap<String, Reply>>,
    served: Arc<AtomicUsize>,
    close_after_each: bool,
) {
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let mut request_line = String::new();
        match reader.read_line(&mut request_line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }

        // Skip the remaining request headers.
        loop {
            let mut header = String::new();
            match reader.read_line(&mut header).await {
                Ok(0) | Err(_) => return,
                Ok(_) if header == "\r\n" => break,
                Ok(_) => {}
            }
        }

        let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
        let reply = routes
            .get(&path)
            .cloned()
            .unwrap_or(Reply::Status(404, "Not Found"));
        served.fetch_add(1, Ordering::SeqCst);

        if reply.send(&mut write_half).await.is_err() {
            return;
        }
        if close_after_each {
            let _ = write_half.shutdown().await;
            return;
        }
    }
}
