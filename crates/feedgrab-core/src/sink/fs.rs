//! Filesystem sink: fetches URLs with curl and writes captured bytes under a
//! download root.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{fetch_to_storage, DownloadId, DownloadReceipt, DownloadSink, DownloadSource, DownloadTask, FetchOptions, SinkError};
use crate::config::SinkConfig;
use crate::storage::{release, reserve_unique, temp_path, StorageWriter};

pub struct FsSink {
    root: PathBuf,
    fetch: FetchOptions,
    next_id: AtomicU64,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>, cfg: &SinkConfig) -> Self {
        Self {
            root: root.into(),
            fetch: FetchOptions::from(cfg),
            next_id: AtomicU64::new(1),
        }
    }

    /// Sink rooted at `cfg.download_dir`, or the current directory.
    pub fn from_config(cfg: &SinkConfig) -> std::io::Result<Self> {
        let root = match &cfg.download_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        Ok(Self::new(root, cfg))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, destination: &Path) -> Result<PathBuf, SinkError> {
        let relative_only = destination
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !relative_only || destination.as_os_str().is_empty() {
            return Err(SinkError::InvalidDestination(destination.to_path_buf()));
        }
        Ok(self.root.join(destination))
    }
}

fn store(source: DownloadSource, target: PathBuf, fetch: FetchOptions) -> Result<(PathBuf, u64), SinkError> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| SinkError::Storage(anyhow::anyhow!("create {}: {}", parent.display(), e)))?;
    }
    let final_path = reserve_unique(&target).map_err(SinkError::Storage)?;
    match fill(&source, &final_path, &fetch) {
        Ok(written) => Ok((final_path, written)),
        Err(e) => {
            release(&final_path);
            Err(e)
        }
    }
}

/// Write the content into a temp beside the reserved `final_path`, then move it into place.
fn fill(source: &DownloadSource, final_path: &Path, fetch: &FetchOptions) -> Result<u64, SinkError> {
    let writer = StorageWriter::create(&temp_path(final_path)).map_err(SinkError::Storage)?;

    let written = match source {
        DownloadSource::Url(url) => fetch_to_storage(url, &writer, fetch),
        DownloadSource::Captured(media) => writer
            .write_at(0, &media.bytes)
            .map(|()| media.bytes.len() as u64)
            .map_err(SinkError::Storage),
    }
    .and_then(|n| writer.sync().map(|()| n).map_err(SinkError::Storage));

    match written {
        Ok(n) => {
            writer.finalize(final_path).map_err(SinkError::Storage)?;
            Ok(n)
        }
        Err(e) => {
            writer.discard();
            Err(e)
        }
    }
}

impl DownloadSink for FsSink {
    async fn submit(&self, task: DownloadTask) -> Result<DownloadReceipt, SinkError> {
        let target = self.resolve(&task.destination)?;
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let fetch = self.fetch.clone();
        tracing::debug!(id = id.0, source = %task.describe(), dest = %target.display(), "sink accepted task");

        let (path, bytes) = tokio::task::spawn_blocking(move || store(task.source, target, fetch))
            .await
            .map_err(|e| SinkError::Worker(e.to_string()))??;

        tracing::info!(id = id.0, bytes, path = %path.display(), "saved");
        Ok(DownloadReceipt { id, path, bytes })
    }
}
