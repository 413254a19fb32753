//! The individual acquisition strategies, in fallback order.

use std::fmt;

use crate::config::CaptureConfig;
use crate::dom::{CaptureError, CapturedMedia, Document, Element};
use crate::media::MediaReference;

/// One way of turning a media reference into bytes for the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Read the live element's in-memory source.
    DirectCapture,
    /// Record a short excerpt of the live stream.
    StreamRecord,
    /// Bulk read through the ephemeral reference's own transport.
    EphemeralFetch,
    /// Single rasterized frame of a mounted video. Degraded result.
    FrameRaster,
    /// Hand the URL to the privileged sink.
    SinkFetch,
}

impl Strategy {
    /// Fallback chain, best first.
    pub const CHAIN: [Strategy; 5] = [
        Strategy::DirectCapture,
        Strategy::StreamRecord,
        Strategy::EphemeralFetch,
        Strategy::FrameRaster,
        Strategy::SinkFetch,
    ];

    /// Whether this strategy can be attempted for `reference` right now.
    /// Element strategies require the handle to be present and still mounted.
    pub fn applies_to<E: Element>(self, reference: &MediaReference<E>) -> bool {
        let live = reference
            .element
            .as_ref()
            .is_some_and(|el| el.is_connected());
        match self {
            Strategy::DirectCapture | Strategy::StreamRecord => reference.ephemeral && live,
            Strategy::EphemeralFetch => reference.ephemeral,
            Strategy::FrameRaster => reference.is_video() && live,
            Strategy::SinkFetch => !reference.ephemeral,
        }
    }

    pub fn is_degraded(self) -> bool {
        self == Strategy::FrameRaster
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::DirectCapture => "direct-capture",
            Strategy::StreamRecord => "stream-record",
            Strategy::EphemeralFetch => "ephemeral-fetch",
            Strategy::FrameRaster => "frame-raster",
            Strategy::SinkFetch => "sink-fetch",
        };
        f.write_str(name)
    }
}

/// Poll until the element has current data. Bounded by `ready_timeout`.
pub(crate) async fn wait_ready<E: Element>(el: &E, cfg: &CaptureConfig) -> Result<(), CaptureError> {
    let poll = async {
        loop {
            if !el.is_connected() {
                return Err(CaptureError::Detached);
            }
            if el.ready_state().has_current_data() {
                return Ok(());
            }
            tokio::time::sleep(cfg.ready_poll()).await;
        }
    };
    match tokio::time::timeout(cfg.ready_timeout(), poll).await {
        Ok(result) => result,
        Err(_) => Err(CaptureError::NotReady(cfg.ready_timeout())),
    }
}

fn live_element<E: Element>(reference: &MediaReference<E>) -> Result<&E, CaptureError> {
    match &reference.element {
        Some(el) if el.is_connected() => Ok(el),
        _ => Err(CaptureError::Detached),
    }
}

fn non_empty(media: CapturedMedia) -> Result<CapturedMedia, CaptureError> {
    if media.bytes.is_empty() {
        Err(CaptureError::Empty)
    } else {
        Ok(media)
    }
}

/// Run an in-page strategy and return the captured bytes.
/// `SinkFetch` captures nothing and is handled by the caller.
pub(crate) async fn capture<D: Document>(
    strategy: Strategy,
    doc: &D,
    reference: &MediaReference<D::Element>,
    cfg: &CaptureConfig,
) -> Result<CapturedMedia, CaptureError> {
    match strategy {
        Strategy::DirectCapture => {
            let el = live_element(reference)?;
            wait_ready(el, cfg).await?;
            non_empty(el.capture_source()?)
        }
        Strategy::StreamRecord => {
            let el = live_element(reference)?;
            wait_ready(el, cfg).await?;
            el.start_recording()?;
            tokio::time::sleep(cfg.record_duration()).await;
            non_empty(el.stop_recording()?)
        }
        Strategy::EphemeralFetch => non_empty(doc.fetch_ephemeral(&reference.url)?),
        Strategy::FrameRaster => {
            let el = live_element(reference)?;
            wait_ready(el, cfg).await?;
            non_empty(el.rasterize_frame()?)
        }
        Strategy::SinkFetch => Err(CaptureError::Unsupported),
    }
}
