//! Single-stream HTTP GET into a storage writer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::SinkError;
use crate::config::SinkConfig;
use crate::storage::StorageWriter;

/// Per-request curl settings.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl From<&SinkConfig> for FetchOptions {
    fn from(cfg: &SinkConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            referer: cfg.referer.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs.max(1)),
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
        }
    }
}

/// Downloads `url` with a single GET, writing sequentially to `storage`.
/// Returns the number of bytes written. Blocking; run it from `spawn_blocking`.
pub fn fetch_to_storage(url: &str, storage: &StorageWriter, opts: &FetchOptions) -> Result<u64, SinkError> {
    let offset = Arc::new(AtomicU64::new(0));
    let offset_cb = Arc::clone(&offset);
    let storage = storage.clone();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.timeout(opts.timeout)?;
    if let Some(ua) = &opts.user_agent {
        easy.useragent(ua)?;
    }
    if let Some(referer) = &opts.referer {
        easy.referer(referer)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(move |data| {
            let off = offset_cb.fetch_add(data.len() as u64, Ordering::Relaxed);
            match storage.write_at(off, data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    tracing::warn!("sink write failed: {:#}", e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    if !(200..300).contains(&status) {
        return Err(SinkError::Http {
            url: url.to_string(),
            status,
        });
    }

    let written = offset.load(Ordering::Relaxed);
    if written == 0 {
        return Err(SinkError::EmptyBody(url.to_string()));
    }
    Ok(written)
}
