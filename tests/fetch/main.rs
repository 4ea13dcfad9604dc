//! Integration tests for fetching over real TCP connections
//!
//! A local scripted server stands in for the remote host; the client is
//! pointed at it through `ClientConfig::port`.

mod server;

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use rawfetch::app::{
    process_address, ClientConfig, Console, ConsoleConfig, ExtensionSet, FetchContext, FetchPool,
};
use rawfetch::errors::{FetchError, ProtocolError};

use server::{Reply, TestServer};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn context(server: &TestServer, dir: &Path) -> (FetchContext, Captured) {
    let output = Captured::default();
    let console = Console::with_writer(
        Box::new(output.clone()),
        ConsoleConfig {
            progress_bars: false,
            ..Default::default()
        },
    );
    let ctx = FetchContext {
        client: ClientConfig {
            port: server.port(),
            ..Default::default()
        },
        output_dir: dir.to_path_buf(),
        console: Arc::new(console),
        extensions: Arc::new(ExtensionSet::default()),
        cancel: CancellationToken::new(),
    };
    (ctx, output)
}

fn listing(links: &[&str]) -> Vec<u8> {
    let mut page = String::from("<html><body><h1>Index of /files</h1>\n");
    for link in links {
        page.push_str(&format!("<a href=\"{}\">{}</a><br>\n", link, link));
    }
    page.push_str("</body></html>\n");
    page.into_bytes()
}

fn no_partial_files(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .all(|entry| !entry.file_name().to_string_lossy().ends_with(".part"))
}

#[tokio::test]
async fn fixed_length_file_is_saved() {
    let body: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let server = TestServer::start(vec![("/data/blob.bin", Reply::Fixed(body.clone()))], false).await;
    let dir = TempDir::new().unwrap();
    let (ctx, output) = context(&server, dir.path());

    let report = process_address("http://127.0.0.1/data/blob.bin", &ctx).await.unwrap();

    assert_eq!(report.files, 1);
    assert_eq!(report.bytes, 10_000);
    assert_eq!(std::fs::read(dir.path().join("blob.bin")).unwrap(), body);
    assert!(no_partial_files(dir.path()));

    let text = output.text();
    assert!(text.contains("Connection successfully established."));
    assert!(text.contains("Host name: 127.0.0.1"));
    assert!(text.contains("Host IP: 127.0.0.1"));
}

#[tokio::test]
async fn chunked_file_is_decoded() {
    let server = TestServer::start(
        vec![("/wiki.txt", Reply::Chunked(vec!["Wiki", "pedia", " in\r\n\r\nchunks."]))],
        false,
    )
    .await;
    let dir = TempDir::new().unwrap();
    let (ctx, _) = context(&server, dir.path());

    let report = process_address("http://127.0.0.1/wiki.txt", &ctx).await.unwrap();

    assert_eq!(report.bytes, 23);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("wiki.txt")).unwrap(),
        "Wikipedia in\r\n\r\nchunks."
    );
}

const BROKEN_CHUNKS: &[u8] =
    b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWikiXX5\r\npedia\r\n0\r\n\r\n";

#[tokio::test]
async fn malformed_chunk_leaves_no_file() {
    let server = TestServer::start(vec![("/wiki.txt", Reply::Raw(BROKEN_CHUNKS.to_vec()))], false).await;
    let dir = TempDir::new().unwrap();
    let (ctx, _) = context(&server, dir.path());

    let err = process_address("http://127.0.0.1/wiki.txt", &ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::Protocol(ProtocolError::ChunkFraming { .. })
    ));
    assert!(!dir.path().join("wiki.txt").exists());
    assert!(no_partial_files(dir.path()));
}

#[tokio::test]
async fn not_found_writes_nothing() {
    let server = TestServer::start(vec![], false).await;
    let dir = TempDir::new().unwrap();
    let (ctx, _) = context(&server, dir.path());

    let err = process_address("http://127.0.0.1/missing.pdf", &ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::NonSuccessStatus {
            status: 404,
            reason: "Not Found"
        }
    ));
    assert_eq!(err.to_string(), "Server returned HTTP 404 Not Found");
    assert!(!dir.path().join("missing.pdf").exists());
    assert!(no_partial_files(dir.path()));
}

#[tokio::test]
async fn folder_crawl_reuses_one_connection() {
    let server = TestServer::start(
        vec![
            (
                "/files/",
                Reply::Fixed(listing(&["notes.txt", "archive.zip", "subdir/", "?C=N;O=D"])),
            ),
            ("/files/notes.txt", Reply::Fixed(b"some notes".to_vec())),
            ("/files/archive.zip", Reply::Chunked(vec!["PK", "\x03\x04"])),
        ],
        false,
    )
    .await;
    let dir = TempDir::new().unwrap();
    let (ctx, output) = context(&server, dir.path());

    let report = process_address("http://127.0.0.1/files/", &ctx).await.unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(report.failures, 0);
    let folder = dir.path().join("files");
    assert_eq!(
        std::fs::read_to_string(folder.join("notes.txt")).unwrap(),
        "some notes"
    );
    assert_eq!(std::fs::read(folder.join("archive.zip")).unwrap(), b"PK\x03\x04");
    assert!(no_partial_files(&folder));

    assert_eq!(server.connections(), 1);
    assert_eq!(server.requests(), 3);
    assert!(output.text().contains("Found 2 files"));
}

#[tokio::test]
async fn folder_crawl_continues_after_failed_file() {
    let server = TestServer::start(
        vec![
            ("/files/", Reply::Fixed(listing(&["gone.pdf", "kept.csv"]))),
            ("/files/kept.csv", Reply::Fixed(b"a,b\n1,2\n".to_vec())),
        ],
        false,
    )
    .await;
    let dir = TempDir::new().unwrap();
    let (ctx, output) = context(&server, dir.path());

    let report = process_address("http://127.0.0.1/files/", &ctx).await.unwrap();

    assert_eq!(report.files, 1);
    assert_eq!(report.failures, 1);
    assert!(dir.path().join("files").join("kept.csv").exists());
    assert!(!dir.path().join("files").join("gone.pdf").exists());
    // The 404 body is left unread, so the next file needs a new connection.
    assert_eq!(server.connections(), 2);
    assert!(output.text().contains("Failed to download"));
}

#[tokio::test]
async fn folder_crawl_reconnects_after_malformed_chunk() {
    let server = TestServer::start(
        vec![
            ("/files/", Reply::Fixed(listing(&["broken.txt", "fine.txt"]))),
            ("/files/broken.txt", Reply::Raw(BROKEN_CHUNKS.to_vec())),
            ("/files/fine.txt", Reply::Chunked(vec!["still ", "here"])),
        ],
        false,
    )
    .await;
    let dir = TempDir::new().unwrap();
    let (ctx, _) = context(&server, dir.path());

    let report = process_address("http://127.0.0.1/files/", &ctx).await.unwrap();

    assert_eq!(report.files, 1);
    assert_eq!(report.failures, 1);
    let folder = dir.path().join("files");
    assert!(!folder.join("broken.txt").exists());
    assert_eq!(
        std::fs::read_to_string(folder.join("fine.txt")).unwrap(),
        "still here"
    );
    assert!(no_partial_files(&folder));
    assert_eq!(server.connections(), 2);
}

#[tokio::test]
async fn closed_keep_alive_connection_is_retried() {
    let server = TestServer::start(
        vec![
            ("/pub/", Reply::Fixed(listing(&["one.txt", "two.txt"]))),
            ("/pub/one.txt", Reply::Fixed(b"1".to_vec())),
            ("/pub/two.txt", Reply::Chunked(vec!["2"])),
        ],
        true,
    )
    .await;
    let dir = TempDir::new().unwrap();
    let (ctx, _) = context(&server, dir.path());

    let report = process_address("http://127.0.0.1/pub/", &ctx).await.unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("pub").join("two.txt")).unwrap(),
        "2"
    );
    assert!(server.connections() >= 3);
}

#[tokio::test]
async fn root_listing_uses_host_folder() {
    let server = TestServer::start(
        vec![
            ("/", Reply::Fixed(listing(&["readme.md"]))),
            ("/readme.md", Reply::Fixed(b"# hi\n".to_vec())),
        ],
        false,
    )
    .await;
    let dir = TempDir::new().unwrap();
    let (ctx, _) = context(&server, dir.path());

    process_address("http://127.0.0.1/", &ctx).await.unwrap();

    assert!(dir.path().join("127.0.0.1").join("readme.md").exists());
}

#[tokio::test]
async fn pool_fetches_at_most_four_urls() {
    let routes: Vec<(&str, Reply)> = vec![
        ("/1.txt", Reply::Fixed(b"1".to_vec())),
        ("/2.txt", Reply::Fixed(b"2".to_vec())),
        ("/3.txt", Reply::Fixed(b"3".to_vec())),
        ("/4.txt", Reply::Fixed(b"4".to_vec())),
        ("/5.txt", Reply::Fixed(b"5".to_vec())),
    ];
    let server = TestServer::start(routes, false).await;
    let dir = TempDir::new().unwrap();
    let (ctx, output) = context(&server, dir.path());

    let urls: Vec<String> = (1..=5).map(|n| format!("http://127.0.0.1/{}.txt", n)).collect();
    let outcomes = FetchPool::new(ctx).run(urls).await;

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes.iter().all(|outcome| outcome.is_success()));
    for n in 1..=4 {
        assert!(dir.path().join(format!("{}.txt", n)).exists());
    }
    assert!(!dir.path().join("5.txt").exists());
    assert_eq!(server.requests(), 4);
    assert!(output.text().contains("http://127.0.0.1/5.txt"));
}

#[tokio::test]
async fn pool_downloads_of_one_name_do_not_collide() {
    let body: Vec<u8> = (0..4096u32).map(|i| (i % 199) as u8).collect();
    let server = TestServer::start(
        vec![("/x.bin", Reply::Slow(body.clone(), Duration::from_millis(300)))],
        false,
    )
    .await;
    let dir = TempDir::new().unwrap();
    let (ctx, _) = context(&server, dir.path());

    let url = "http://127.0.0.1/x.bin".to_string();
    let outcomes = FetchPool::new(ctx).run(vec![url.clone(), url]).await;

    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert!(outcome.is_success(), "{:?}", outcome.result);
    }
    assert_eq!(server.connections(), 2);
    assert_eq!(std::fs::read(dir.path().join("x.bin")).unwrap(), body);
    assert!(no_partial_files(dir.path()));
}
