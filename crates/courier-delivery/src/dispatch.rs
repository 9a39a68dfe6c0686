//! Dispatch: fans a batch of payloads across a bounded worker pool.
//!
//! Every call builds its own pool and tears it down when the batch is
//! done: a semaphore bounds how many uploads run at once, and the join
//! set is drained before returning, so callers never leave work behind.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use courier_core::chunk::split_message;

use crate::webhook::{ChunkOutcome, Uploader};

/// Totals for one dispatched batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items fully delivered.
    pub delivered: usize,
    /// Items the endpoint refused (throttle ceiling, rejection, or a
    /// partially delivered file).
    pub gave_up: usize,
    /// Items that never completed an exchange (transport or file errors).
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.delivered + self.gave_up + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.gave_up == 0 && self.failed == 0
    }
}

/// Runs upload batches over a shared [`Uploader`].
pub struct Dispatcher {
    uploader: Arc<Uploader>,
    max_workers: usize,
}

impl Dispatcher {
    pub fn new(uploader: Arc<Uploader>, max_workers: usize) -> Self {
        Self {
            uploader,
            max_workers: max_workers.max(1),
        }
    }

    /// Split a message and send the chunks. Empty input sends nothing.
    pub async fn dispatch_message(&self, text: &str, max_chars: usize) -> BatchSummary {
        let chunks = split_message(text, max_chars);
        if chunks.len() > 1 {
            tracing::info!(chunks = chunks.len(), "message split for delivery");
        }
        self.dispatch_chunks(chunks).await
    }

    /// Send message chunks concurrently. A failed chunk never cancels the
    /// rest of the batch.
    pub async fn dispatch_chunks(&self, chunks: Vec<String>) -> BatchSummary {
        let total = chunks.len();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for chunk in chunks {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break, // semaphore closed
            };
            let uploader = self.uploader.clone();
            tasks.spawn(async move {
                let result = uploader.send_chunk(&chunk).await;
                drop(permit);
                result
            });
        }

        let mut summary = BatchSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(ChunkOutcome::Delivered)) => summary.delivered += 1,
                Ok(Ok(ChunkOutcome::GaveUp)) => summary.gave_up += 1,
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "chunk send failed");
                    summary.failed += 1;
                }
                Err(err) => {
                    tracing::error!(error = %err, "upload task panicked");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            total,
            delivered = summary.delivered,
            gave_up = summary.gave_up,
            failed = summary.failed,
            "message batch complete"
        );
        summary
    }

    /// Upload files concurrently, splitting oversized ones into parts.
    /// Per-file failures are isolated the same way as chunk failures.
    pub async fn dispatch_files(&self, paths: Vec<PathBuf>) -> BatchSummary {
        let total = paths.len();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for path in paths {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break, // semaphore closed
            };
            let uploader = self.uploader.clone();
            tasks.spawn(async move {
                let result = uploader.upload_file(&path).await;
                drop(permit);
                result
            });
        }

        let mut summary = BatchSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) if outcome.parts_failed == 0 => summary.delivered += 1,
                Ok(Ok(outcome)) => {
                    tracing::warn!(
                        parts_delivered = outcome.parts_delivered,
                        parts_failed = outcome.parts_failed,
                        "file delivered partially"
                    );
                    summary.gave_up += 1;
                }
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "file upload failed");
                    summary.failed += 1;
                }
                Err(err) => {
                    tracing::error!(error = %err, "upload task panicked");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            total,
            delivered = summary.delivered,
            gave_up = summary.gave_up,
            failed = summary.failed,
            "file batch complete"
        );
        summary
    }
}
