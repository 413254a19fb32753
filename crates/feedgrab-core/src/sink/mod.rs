//! Download sink: the privileged side that performs network retrieval and
//! filesystem writes outside the page.
//!
//! The traversal hands over one [`DownloadTask`] per acquisition and awaits the
//! receipt. Rejections are reported, never retried.

mod fetch;
mod fs;

pub use fetch::{fetch_to_storage, FetchOptions};
pub use fs::FsSink;

use std::path::PathBuf;

use crate::dom::CapturedMedia;

/// What to collision-check at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Append a numeric suffix until the name is free.
    #[default]
    Uniquify,
}

/// Bytes to store: either a URL the sink retrieves itself, or bytes already
/// captured from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    Url(String),
    Captured(CapturedMedia),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub source: DownloadSource,
    /// Relative to the sink's root.
    pub destination: PathBuf,
    pub conflict: ConflictPolicy,
}

impl DownloadTask {
    pub fn url(url: impl Into<String>, destination: PathBuf) -> Self {
        Self {
            source: DownloadSource::Url(url.into()),
            destination,
            conflict: ConflictPolicy::Uniquify,
        }
    }

    pub fn captured(media: CapturedMedia, destination: PathBuf) -> Self {
        Self {
            source: DownloadSource::Captured(media),
            destination,
            conflict: ConflictPolicy::Uniquify,
        }
    }

    /// Short description for logs (never the captured bytes).
    pub fn describe(&self) -> String {
        match &self.source {
            DownloadSource::Url(u) => u.clone(),
            DownloadSource::Captured(m) => format!("<{} bytes {}>", m.bytes.len(), m.mime),
        }
    }
}

/// Opaque identifier the sink assigns to an accepted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownloadId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub id: DownloadId,
    /// Where the file actually landed (after uniquify).
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("destination escapes the download root: {0}")]
    InvalidDestination(PathBuf),
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },
    #[error("empty response body from {0}")]
    EmptyBody(String),
    #[error("storage: {0:#}")]
    Storage(anyhow::Error),
    #[error("sink worker failed: {0}")]
    Worker(String),
}

/// Host-provided facility that stores media.
#[allow(async_fn_in_trait)]
pub trait DownloadSink {
    async fn submit(&self, task: DownloadTask) -> Result<DownloadReceipt, SinkError>;
}
