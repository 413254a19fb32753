use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::naming::FolderLayout;
use crate::selectors::SelectorSet;

/// Hard bound on items per traversal, whatever the settings say.
pub const MAX_POSTS_LIMIT: usize = 100;

/// User-facing settings (the `[settings]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Start traversal as soon as a session is loaded.
    pub auto_download: bool,
    /// Acquire video sources (ephemeral streams).
    pub download_videos: bool,
    /// Acquire video poster images.
    pub download_thumbnails: bool,
    pub folder_structure: FolderLayout,
    /// Items processed per traversal; clamped to 1..=100.
    pub max_posts: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_download: false,
            download_videos: true,
            download_thumbnails: true,
            folder_structure: FolderLayout::Profile,
            max_posts: 50,
        }
    }
}

impl Settings {
    pub fn effective_max_posts(&self) -> usize {
        self.max_posts.clamp(1, MAX_POSTS_LIMIT)
    }
}

/// Pacing and termination of the carousel and feed loops (`[traversal]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Images shorter than this are treated as avatars/icons.
    pub min_image_height: u32,
    /// Pause after each acquisition.
    pub acquire_delay_ms: u64,
    /// Pause after acquiring a video.
    pub video_delay_ms: u64,
    /// Wait after clicking "next slide".
    pub slide_settle_ms: u64,
    /// Wait after dispatching "next item".
    pub item_settle_ms: u64,
    /// Consecutive scans without new media that end a carousel.
    pub max_empty_scans: u32,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            min_image_height: 400,
            acquire_delay_ms: 300,
            video_delay_ms: 500,
            slide_settle_ms: 150,
            item_settle_ms: 200,
            max_empty_scans: 2,
        }
    }
}

impl TraversalConfig {
    pub fn acquire_delay(&self, after_video: bool) -> Duration {
        Duration::from_millis(if after_video {
            self.video_delay_ms
        } else {
            self.acquire_delay_ms
        })
    }

    pub fn slide_settle(&self) -> Duration {
        Duration::from_millis(self.slide_settle_ms)
    }

    pub fn item_settle(&self) -> Duration {
        Duration::from_millis(self.item_settle_ms)
    }
}

/// In-page capture limits (`[capture]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Longest wait for a video element to reach a ready state.
    pub ready_timeout_ms: u64,
    pub ready_poll_ms: u64,
    /// Length of the live stream excerpt recorded as a fallback.
    pub record_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 5000,
            ready_poll_ms: 50,
            record_ms: 1000,
        }
    }
}

impl CaptureConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn ready_poll(&self) -> Duration {
        Duration::from_millis(self.ready_poll_ms.max(1))
    }

    pub fn record_duration(&self) -> Duration {
        Duration::from_millis(self.record_ms)
    }
}

/// Filesystem download sink (`[sink]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Download root; None = current directory at run time.
    pub download_dir: Option<PathBuf>,
    pub user_agent: Option<String>,
    /// Sent as Referer on CDN fetches.
    pub referer: Option<String>,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            user_agent: None,
            referer: Some("https://www.instagram.com/".to_string()),
            connect_timeout_secs: 30,
            timeout_secs: 600,
        }
    }
}

/// Per-item control affordance (`[surface]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Tick of the running indicator's pulse.
    pub pulse_ms: u64,
    /// How often the host re-attaches controls to newly rendered items.
    pub attach_ms: u64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            pulse_ms: 100,
            attach_ms: 200,
        }
    }
}

impl SurfaceConfig {
    pub fn pulse_interval(&self) -> Duration {
        Duration::from_millis(self.pulse_ms.max(1))
    }

    pub fn attach_interval(&self) -> Duration {
        Duration::from_millis(self.attach_ms.max(1))
    }
}

/// Global configuration loaded from `~/.config/feedgrab/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedgrabConfig {
    pub settings: Settings,
    pub traversal: TraversalConfig,
    pub capture: CaptureConfig,
    pub sink: SinkConfig,
    pub surface: SurfaceConfig,
    pub selectors: SelectorSet,
}

impl FeedgrabConfig {
    pub fn validate(&self) -> Result<()> {
        self.selectors.validate()?;
        if self.traversal.max_empty_scans == 0 {
            anyhow::bail!("traversal.max_empty_scans must be at least 1");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("feedgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FeedgrabConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FeedgrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: FeedgrabConfig = toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
