//! `feedgrab status` – show cumulative stats.

use anyhow::Result;
use feedgrab_core::stats::DownloadStats;

pub fn run_status() -> Result<()> {
    let path = DownloadStats::default_path()?;
    let stats = DownloadStats::load_from_path(&path)?;
    let live = feedgrab_core::control::default_control_socket_path()
        .map(|p| p.exists())
        .unwrap_or(false);

    println!("{:<14} {}", "posts", stats.total_posts);
    println!("{:<14} {}", "media", stats.total_media);
    println!("{:<14} {}", "last run", stats.current_post);
    println!(
        "{:<14} {}",
        "state",
        if stats.is_running || live { "running" } else { "idle" }
    );
    Ok(())
}
