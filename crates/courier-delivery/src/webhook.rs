//! Webhook uploads: JSON message chunks and multipart file payloads.
//!
//! One [`Uploader`] is shared by all dispatch workers. Every request claims
//! a slot from the shared rate limiter first; throttle responses back off
//! per [`RetryPolicy`](crate::retry::RetryPolicy) and resend.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use courier_core::chunk::split_file;
use courier_core::config::DeliveryConfig;

use crate::limiter::RateLimiter;
use crate::retry::RetryPolicy;

/// Errors that abort an upload item.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("file error at {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeliveryError {
    fn file_io(path: &Path, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// JSON body for a message chunk.
#[derive(Serialize)]
struct MessagePayload<'a> {
    content: &'a str,
}

/// Response body for uploads that answer with attachment metadata
/// instead of a bare 204.
#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    attachments: Vec<Attachment>,
}

#[derive(Deserialize)]
struct Attachment {
    url: String,
}

/// Terminal result of one chunk send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    Delivered,
    /// Dropped after the retry ceiling or a non-retryable response.
    GaveUp,
}

/// Result of one whole-file upload, parts included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOutcome {
    pub parts_delivered: usize,
    pub parts_failed: usize,
}

/// Sends payloads to the configured webhook endpoint.
pub struct Uploader {
    client: reqwest::Client,
    url: String,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    max_file_size: u64,
}

impl Uploader {
    pub fn new(config: &DeliveryConfig, limiter: Arc<RateLimiter>) -> Result<Self, DeliveryError> {
        let mut builder = reqwest::Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
            url: config.url.clone(),
            limiter,
            retry: RetryPolicy::default(),
            max_file_size: config.max_file_size,
        })
    }

    /// Send one message chunk as a JSON body.
    ///
    /// 204 is delivered. A throttle response backs off and resends the same
    /// chunk, up to the retry ceiling; every resend claims a fresh rate
    /// limiter slot. Any other status abandons the chunk without retry.
    pub async fn send_chunk(&self, chunk: &str) -> Result<ChunkOutcome, DeliveryError> {
        let mut retry_count = 0u32;
        loop {
            self.limiter.wait_for_next_request().await;
            let response = self
                .client
                .post(&self.url)
                .json(&MessagePayload { content: chunk })
                .send()
                .await?;

            let status = response.status();
            if status == reqwest::StatusCode::NO_CONTENT {
                tracing::info!(chars = chunk.chars().count(), "message chunk delivered");
                return Ok(ChunkOutcome::Delivered);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = parse_retry_after(
                    response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok()),
                );
                let wait = self
                    .retry
                    .backoff(Duration::from_secs(retry_after), retry_count);
                tracing::warn!(
                    retry_after_secs = retry_after,
                    wait_secs = wait.as_secs(),
                    retry_count,
                    "endpoint throttled send, backing off"
                );
                tokio::time::sleep(wait).await;
                retry_count += 1;
                if self.retry.exhausted(retry_count) {
                    tracing::error!(retry_count, "retry ceiling reached, dropping chunk");
                    return Ok(ChunkOutcome::GaveUp);
                }
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = excerpt(&body, 200),
                "chunk rejected by endpoint"
            );
            return Ok(ChunkOutcome::GaveUp);
        }
    }

    /// Upload a file, splitting it into parts when it exceeds the size
    /// limit.
    ///
    /// The worklist is iterative: a part that still exceeds the limit is
    /// split again. Each part is an independent upload, so an endpoint
    /// rejection of one part does not stop the rest. Filesystem errors
    /// abort the whole item.
    pub async fn upload_file(&self, path: &Path) -> Result<FileOutcome, DeliveryError> {
        let mut outcome = FileOutcome::default();
        let mut pending: VecDeque<PathBuf> = VecDeque::new();
        pending.push_back(path.to_path_buf());

        while let Some(next) = pending.pop_front() {
            let size = tokio::fs::metadata(&next)
                .await
                .map_err(|e| DeliveryError::file_io(&next, e))?
                .len();

            if size > self.max_file_size {
                tracing::info!(
                    path = %next.display(),
                    bytes = size,
                    limit = self.max_file_size,
                    "file exceeds size limit, splitting"
                );
                let parts = split_file(&next, self.max_file_size)
                    .map_err(|e| DeliveryError::file_io(&next, e))?;
                for part in parts.into_iter().rev() {
                    pending.push_front(part);
                }
                continue;
            }

            match self.send_file_once(&next, size).await {
                Ok(true) => outcome.parts_delivered += 1,
                Ok(false) => outcome.parts_failed += 1,
                Err(DeliveryError::Transport(err)) => {
                    tracing::error!(
                        path = %next.display(),
                        error = %err,
                        "file upload request failed"
                    );
                    outcome.parts_failed += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(outcome)
    }

    /// One multipart POST. Returns whether the endpoint accepted the file:
    /// a bare 204, or any response carrying attachment metadata. File
    /// uploads are not retried.
    async fn send_file_once(&self, path: &Path, size: u64) -> Result<bool, DeliveryError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| DeliveryError::file_io(path, e))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();

        let part = reqwest::multipart::Part::bytes(data).file_name(filename);
        let form = reqwest::multipart::Form::new().part("file", part);

        self.limiter.wait_for_next_request().await;
        let response = self.client.post(&self.url).multipart(form).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            tracing::info!(path = %path.display(), bytes = size, "file uploaded");
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(parsed) = serde_json::from_str::<UploadResponse>(&body) {
            if let Some(attachment) = parsed.attachments.first() {
                if !attachment.url.is_empty() {
                    tracing::info!(
                        path = %path.display(),
                        bytes = size,
                        url = %attachment.url,
                        "file uploaded"
                    );
                    return Ok(true);
                }
            }
        }

        tracing::error!(
            path = %path.display(),
            status = %status,
            body = excerpt(&body, 200),
            "file upload rejected"
        );
        Ok(false)
    }
}

/// `Retry-After` in integer seconds; 1 when absent or unparseable.
fn parse_retry_after(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1)
}

/// First `max` characters of a response body, for log lines.
fn excerpt(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}
