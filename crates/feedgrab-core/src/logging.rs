//! Tracing setup. Replays log to one file per recorded session so runs over
//! different feeds stay apart; other commands share `feedgrab.log`.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,feedgrab_core=debug,feedgrab=debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to this file.
    File(PathBuf),
    Stderr,
}

impl LogTarget {
    /// `$XDG_STATE_HOME/feedgrab/sessions/<session dir name>.log`.
    pub fn for_session(session_dir: &Path) -> Result<Self> {
        let name = session_log_name(session_dir);
        let path = state_dirs()?.place_state_file(Path::new("sessions").join(name))?;
        Ok(LogTarget::File(path))
    }

    /// `$XDG_STATE_HOME/feedgrab/feedgrab.log`.
    pub fn shared() -> Result<Self> {
        Ok(LogTarget::File(state_dirs()?.place_state_file("feedgrab.log")?))
    }
}

fn state_dirs() -> Result<xdg::BaseDirectories> {
    Ok(xdg::BaseDirectories::with_prefix("feedgrab")?)
}

/// File name for a session's log: the directory's own name, made path-safe.
fn session_log_name(session_dir: &Path) -> String {
    let stem: String = session_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "session.log".to_string()
    } else {
        format!("{}.log", stem)
    }
}

/// Install the global subscriber. Fails if the log file cannot be opened or a
/// subscriber is already set.
pub fn init_logging(target: &LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;
            tracing::info!(log = %path.display(), "feedgrab started");
        }
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?,
    }
    Ok(())
}
