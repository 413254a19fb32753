//! Run counters and the persisted cumulative stats file.
//!
//! `RunTally` is updated by the traversal as it goes; `DownloadStats` is read at
//! startup and written after a run, never consulted mid-traversal.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one run (one or more item traversals).
#[derive(Debug, Default)]
pub struct RunTally {
    items: AtomicU64,
    acquired: AtomicU64,
    degraded: AtomicU64,
    failed: AtomicU64,
    sink_rejections: AtomicU64,
}

/// Plain copy of a [`RunTally`] at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallySnapshot {
    pub items: u64,
    /// Full-quality acquisitions.
    pub acquired: u64,
    /// Acquisitions that only produced a single rasterized frame.
    pub degraded: u64,
    /// References for which every strategy failed.
    pub failed: u64,
    pub sink_rejections: u64,
}

impl TallySnapshot {
    /// Media delivered to the sink, full or degraded.
    pub fn delivered(&self) -> u64 {
        self.acquired + self.degraded
    }
}

impl RunTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_done(&self) {
        self.items.fetch_add(1, Ordering::Relaxed);
    }

    pub fn acquired(&self) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn degraded(&self) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sink_rejected(&self) {
        self.sink_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            items: self.items.load(Ordering::Relaxed),
            acquired: self.acquired.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            sink_rejections: self.sink_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Cumulative stats kept across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DownloadStats {
    pub total_posts: u64,
    pub total_media: u64,
    /// Items processed by the most recent run.
    pub current_post: u64,
    pub is_running: bool,
}

impl DownloadStats {
    /// Default path: `~/.local/state/feedgrab/stats.json`.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("feedgrab")?;
        Ok(xdg_dirs.place_state_file("stats.json")?)
    }

    /// Fold a finished run into the totals.
    pub fn record_run(&mut self, run: &TallySnapshot) {
        self.total_posts += run.items;
        self.total_media += run.delivered();
        self.current_post = run.items;
        self.is_running = false;
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize stats")?;
        std::fs::write(path, json).with_context(|| format!("write stats: {}", path.display()))?;
        Ok(())
    }

    /// Load stats; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<DownloadStats> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DownloadStats::default()),
            Err(e) => return Err(e).with_context(|| format!("read stats: {}", path.display())),
        };
        serde_json::from_slice(&bytes).with_context(|| format!("parse stats: {}", path.display()))
    }
}
