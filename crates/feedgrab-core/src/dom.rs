//! Page abstraction the traversal runs against.
//!
//! A `Document` is the live feed page; an `Element` is a handle to one mounted
//! node. Handles may go stale at any time (the page unmounts items as the feed
//! moves), so nothing here assumes a handle stays connected between calls.

use std::time::Duration;

/// Stable identity of a DOM node for as long as it stays mounted.
/// Two handles with the same key refer to the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

/// Media element readiness, in the order the page advances through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

impl ReadyState {
    /// Enough data to read or draw the current frame.
    pub fn has_current_data(self) -> bool {
        self >= ReadyState::HaveCurrentData
    }
}

/// Bytes lifted out of the page (in-memory source, recording, or raster).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMedia {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl CapturedMedia {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }
}

/// Failure of an in-page capture operation.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture not supported by this page")]
    Unsupported,
    #[error("element is no longer mounted")]
    Detached,
    #[error("media not ready after {0:?}")]
    NotReady(Duration),
    #[error("ephemeral reference is no longer live: {0}")]
    Revoked(String),
    #[error("capture produced no data")]
    Empty,
    #[error("capture failed: {0}")]
    Failed(String),
}

/// Handle to a mounted page element.
pub trait Element: Clone {
    fn key(&self) -> NodeKey;

    /// Descendants matching a CSS selector, in document order.
    fn select_all(&self, selector: &str) -> Vec<Self>;

    fn select_first(&self, selector: &str) -> Option<Self> {
        self.select_all(selector).into_iter().next()
    }

    fn attr(&self, name: &str) -> Option<String>;

    fn text(&self) -> String;

    /// Intrinsic height of an image, 0 when unknown.
    fn natural_height(&self) -> u32;

    /// Currently laid out (has an offset parent).
    fn is_rendered(&self) -> bool;

    /// Still attached to the document.
    fn is_connected(&self) -> bool;

    /// Simulated user click.
    fn click(&self);

    fn ready_state(&self) -> ReadyState {
        ReadyState::HaveNothing
    }

    /// Read the element's in-memory media source.
    fn capture_source(&self) -> Result<CapturedMedia, CaptureError> {
        Err(CaptureError::Unsupported)
    }

    /// Begin recording the element's live media stream.
    fn start_recording(&self) -> Result<(), CaptureError> {
        Err(CaptureError::Unsupported)
    }

    /// Stop a recording started with [`Element::start_recording`] and return the clip.
    fn stop_recording(&self) -> Result<CapturedMedia, CaptureError> {
        Err(CaptureError::Unsupported)
    }

    /// Draw the currently visible frame to an offscreen surface (PNG).
    fn rasterize_frame(&self) -> Result<CapturedMedia, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

/// The feed page.
pub trait Document {
    type Element: Element;

    fn select_all(&self, selector: &str) -> Vec<Self::Element>;

    fn select_first(&self, selector: &str) -> Option<Self::Element> {
        self.select_all(selector).into_iter().next()
    }

    /// Dispatch a keydown for `key` on the document.
    fn dispatch_key(&self, key: &str);

    /// Bulk-read the bytes behind an ephemeral in-page reference.
    fn fetch_ephemeral(&self, url: &str) -> Result<CapturedMedia, CaptureError> {
        Err(CaptureError::Revoked(url.to_string()))
    }
}
