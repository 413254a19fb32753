//! Acquisition: turns a media reference into exactly one accepted download task.
//!
//! Strategies are tried in [`Strategy::CHAIN`] order, skipping those that do not
//! apply. A failing strategy is logged and the next one tried; only running out
//! of strategies is an error.

mod strategy;

pub use strategy::Strategy;

use strategy::capture;

use crate::config::CaptureConfig;
use crate::dom::Document;
use crate::media::MediaReference;
use crate::naming::{extension_from_mime, extension_from_url, FolderLayout, MediaName};
use crate::sink::{DownloadReceipt, DownloadSink, DownloadTask};
use crate::stats::RunTally;

/// Successful acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    Full(DownloadReceipt),
    /// Only a single frame of the media could be saved.
    Degraded(DownloadReceipt),
}

impl Acquired {
    pub fn receipt(&self) -> &DownloadReceipt {
        match self {
            Acquired::Full(r) | Acquired::Degraded(r) => r,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Acquired::Degraded(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("no applicable acquisition strategy for {url}")]
    NoStrategy { url: String },
    #[error("all {tried} applicable strategies failed for {url}")]
    Exhausted { url: String, tried: usize },
}

/// Runs the strategy chain against one page and one sink.
pub struct Acquirer<'a, D, S> {
    doc: &'a D,
    sink: &'a S,
    capture: &'a CaptureConfig,
    layout: FolderLayout,
    tally: &'a RunTally,
}

impl<'a, D: Document, S: DownloadSink> Acquirer<'a, D, S> {
    pub fn new(doc: &'a D, sink: &'a S, capture: &'a CaptureConfig, layout: FolderLayout, tally: &'a RunTally) -> Self {
        Self {
            doc,
            sink,
            capture,
            layout,
            tally,
        }
    }

    pub async fn acquire(
        &self,
        reference: &MediaReference<D::Element>,
        name: &MediaName,
    ) -> Result<Acquired, AcquireError> {
        let mut tried = 0usize;
        for strategy in Strategy::CHAIN {
            if !strategy.applies_to(reference) {
                continue;
            }
            tried += 1;

            let task = match strategy {
                Strategy::SinkFetch => {
                    let ext = extension_from_url(&reference.url, name.kind);
                    DownloadTask::url(reference.url.clone(), name.destination(self.layout, &ext))
                }
                _ => match capture(strategy, self.doc, reference, self.capture).await {
                    Ok(media) => {
                        let ext = extension_from_mime(&media.mime);
                        DownloadTask::captured(media, name.destination(self.layout, ext))
                    }
                    Err(e) => {
                        tracing::warn!(%strategy, url = %reference.url, "capture failed: {}", e);
                        continue;
                    }
                },
            };

            match self.sink.submit(task).await {
                Ok(receipt) if strategy.is_degraded() => {
                    tracing::warn!(url = %reference.url, path = %receipt.path.display(), "saved a single frame only");
                    self.tally.degraded();
                    return Ok(Acquired::Degraded(receipt));
                }
                Ok(receipt) => {
                    tracing::debug!(%strategy, url = %reference.url, "acquired");
                    self.tally.acquired();
                    return Ok(Acquired::Full(receipt));
                }
                Err(e) => {
                    tracing::warn!(%strategy, url = %reference.url, "sink rejected task: {}", e);
                    self.tally.sink_rejected();
                }
            }
        }

        let url = reference.url.clone();
        if tried == 0 {
            Err(AcquireError::NoStrategy { url })
        } else {
            Err(AcquireError::Exhausted { url, tried })
        }
    }
}
