//! File and folder downloads over a `Session`
//!
//! A file download streams the body into a `.part` file that is renamed into
//! place once decoding finished. A folder download fetches the listing page
//! into memory, extracts the linked files and downloads each of them over
//! the same session.

use std::path::Path;

use tracing::{debug, info, warn};

use super::session::Session;
use super::FetchContext;
use crate::app::listing::extract_links;
use crate::app::protocol::Framing;
use crate::app::storage::{prepare_folder, PartialFile};
use crate::app::target::Target;
use crate::errors::{FetchError, FetchResult};

/// What one `process_address` call wrote
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchReport {
    /// Files saved under their final name
    pub files: usize,
    /// Body bytes written across those files
    pub bytes: u64,
    /// Files of a folder that could not be downloaded
    pub failures: usize,
}

impl FetchReport {
    fn record(&mut self, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
    }
}

/// Download `target` into `dir`, returning the bytes written.
pub async fn download_file(
    session: &mut Session,
    target: &Target,
    dir: &Path,
    ctx: &FetchContext,
) -> FetchResult<u64> {
    let head = session.request(&target.request_path()).await?;
    if head.framing == Framing::Unspecified {
        warn!(
            "{} has neither Content-Length nor chunked encoding; saving an empty file",
            target
        );
    }

    let destination = dir.join(target.file_name());
    let mut partial = match PartialFile::create(&destination).await {
        Ok(partial) => partial,
        Err(e) => {
            // The response body is still pending on the connection.
            session.discard().await;
            return Err(FetchError::Storage {
                path: destination,
                source: e,
            });
        }
    };

    let mut progress = ctx.console.transfer(&target.file_name(), head.framing.known_length());
    match session.read_body(&head, partial.file_mut(), &mut progress).await {
        Ok(written) => {
            progress.finish();
            let saved = partial
                .commit()
                .await
                .map_err(|source| FetchError::Storage {
                    path: destination.clone(),
                    source,
                })?;
            info!("Saved {} ({} bytes)", saved.display(), written);
            ctx.console
                .line(format!("Saved {} ({} bytes)", saved.display(), written));
            Ok(written)
        }
        Err(e) => {
            progress.abandon();
            partial.abandon().await;
            Err(e)
        }
    }
}

/// Download every file linked from the listing at `folder`.
///
/// Individual file failures are counted and reported; only cancellation
/// stops the crawl early.
pub async fn crawl_folder(
    session: &mut Session,
    folder: &Target,
    ctx: &FetchContext,
) -> FetchResult<FetchReport> {
    let head = session.request(&folder.request_path()).await?;
    let mut listing = Vec::new();
    session.read_body(&head, &mut listing, &mut ()).await?;

    let body = String::from_utf8_lossy(&listing);
    let links = extract_links(&body, &ctx.extensions);
    debug!("{} links found in {}", links.len(), folder);

    let dir = prepare_folder(&ctx.output_dir, &folder.folder_name()).await;
    ctx.console.line(format!(
        "Found {} files in {}, saving to {}",
        links.len(),
        folder,
        dir.display()
    ));

    let mut report = FetchReport::default();
    for link in &links {
        let Some(target) = folder.join(link) else {
            warn!("Skipping {}: not on {}", link, folder.host());
            continue;
        };

        match download_file(session, &target, &dir, ctx).await {
            Ok(bytes) => report.record(bytes),
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(e) => {
                warn!("Download of {} failed: {}", target, e);
                ctx.console
                    .error([format!("Failed to download {}: {}", target, e)]);
                report.failures += 1;
            }
        }
    }

    Ok(report)
}

/// Download a single-file URL into the output directory.
pub async fn fetch_single(
    session: &mut Session,
    target: &Target,
    ctx: &FetchContext,
) -> FetchResult<FetchReport> {
    let mut report = FetchReport::default();
    let bytes = download_file(session, target, &ctx.output_dir, ctx).await?;
    report.record(bytes);
    Ok(report)
}
