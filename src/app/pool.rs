//! Bounded pool of concurrent fetches
//!
//! Every accepted URL runs `process_address` in its own task of a `JoinSet`.
//! The pool never runs more than `max_concurrent` fetches; URLs beyond that
//! limit are dropped up front, not queued.

use std::future::Future;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::app::client::{process_address, FetchContext, FetchReport};
use crate::constants::MAX_CONCURRENT_FETCHES;
use crate::errors::{FetchError, FetchResult};

/// Result of one URL
#[derive(Debug)]
pub struct FetchOutcome {
    pub url: String,
    pub result: FetchResult<FetchReport>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs fetches for a batch of URLs
#[derive(Debug)]
pub struct FetchPool {
    ctx: FetchContext,
    max_concurrent: usize,
}

impl FetchPool {
    pub fn new(ctx: FetchContext) -> Self {
        Self {
            ctx,
            max_concurrent: MAX_CONCURRENT_FETCHES,
        }
    }

    /// Lower the concurrency limit; values outside `1..=4` are clamped.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.clamp(1, MAX_CONCURRENT_FETCHES);
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Fetch the first `max_concurrent` URLs concurrently.
    ///
    /// Outcomes are returned in the order the URLs were given. A task that
    /// panics yields a `FetchError::TaskFailed` outcome for its own URL and
    /// does not affect the others.
    pub async fn run(&self, urls: Vec<String>) -> Vec<FetchOutcome> {
        self.run_with(urls, |url, ctx| async move {
            process_address(&url, &ctx).await
        })
        .await
    }

    async fn run_with<F, Fut>(&self, urls: Vec<String>, fetch: F) -> Vec<FetchOutcome>
    where
        F: Fn(String, FetchContext) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = FetchResult<FetchReport>> + Send + 'static,
    {
        let mut urls = urls;
        let dropped = if urls.len() > self.max_concurrent {
            urls.split_off(self.max_concurrent)
        } else {
            Vec::new()
        };

        if !dropped.is_empty() {
            warn!(
                "At most {} URLs are fetched at once; ignoring {}",
                self.max_concurrent,
                dropped.join(", ")
            );
            let mut lines = vec![format!(
                "Too many URLs: only the first {} will be fetched. Ignored:",
                self.max_concurrent
            )];
            lines.extend(dropped.iter().map(|url| format!("  {}", url)));
            self.ctx.console.error(lines);
        }

        info!("Fetching {} URLs", urls.len());

        let mut tasks = JoinSet::new();
        for (index, url) in urls.iter().enumerate() {
            let fetch = fetch.clone();
            let ctx = self.ctx.clone();
            let url = url.clone();
            tasks.spawn(async move {
                // The inner task keeps a panic tied to this index.
                let result = match tokio::spawn(fetch(url.clone(), ctx)).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!("Fetch task for {} failed: {}", url, e);
                        Err(FetchError::TaskFailed(e.to_string()))
                    }
                };
                (index, result)
            });
        }

        let mut results: Vec<Option<FetchResult<FetchReport>>> =
            urls.iter().map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    debug!("Fetch {} finished (ok: {})", index, result.is_ok());
                    results[index] = Some(result);
                }
                Err(e) => warn!("Fetch pool task failed: {}", e),
            }
        }

        urls.into_iter()
            .zip(results)
            .map(|(url, result)| {
                let result = result.unwrap_or_else(|| {
                    Err(FetchError::TaskFailed("task did not complete".to_string()))
                });
                FetchOutcome { url, result }
            })
            .collect()
    }
}
