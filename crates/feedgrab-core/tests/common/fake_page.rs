//! Scriptable in-memory feed page.
//!
//! Understands the default selector set only. Each item is a carousel of
//! slides; only the current slide's media is mounted. The next-slide button is
//! rendered while there is a following slide, or always when the item wraps
//! (clicking on the last slide then leaves it in place).

use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use feedgrab_core::dom::{CaptureError, CapturedMedia, Document, Element, NodeKey, ReadyState};
use feedgrab_core::selectors::SelectorSet;

/// What in-page capture of a video can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCapture {
    /// In-memory source readable directly.
    Direct,
    /// Only a live recording works.
    Record,
    /// Only the ephemeral transport fetch works.
    Fetch,
    /// Only a still frame can be drawn.
    Raster,
    Nothing,
}

#[derive(Debug, Clone)]
pub enum Media {
    Image { src: String, height: u32 },
    Video {
        src: String,
        poster: Option<String>,
        ready: ReadyState,
        capture: VideoCapture,
    },
}

pub fn cdn_image(name: &str) -> Media {
    Media::Image {
        src: format!("https://scontent.cdninstagram.com/v/{}.jpg", name),
        height: 1080,
    }
}

pub fn avatar(name: &str) -> Media {
    Media::Image {
        src: format!("https://scontent.cdninstagram.com/a/{}.jpg", name),
        height: 150,
    }
}

pub fn blob_video(name: &str, capture: VideoCapture) -> Media {
    Media::Video {
        src: format!("blob:https://www.instagram.com/{}", name),
        poster: Some(format!("https://scontent.cdninstagram.com/v/{}_poster.jpg", name)),
        ready: ReadyState::HaveEnoughData,
        capture,
    }
}

#[derive(Debug, Clone)]
pub struct ItemSpec {
    pub profile: String,
    pub datetime: Option<String>,
    pub slides: Vec<Vec<Media>>,
    pub wraps: bool,
}

impl ItemSpec {
    pub fn new(profile: &str, slides: Vec<Vec<Media>>) -> Self {
        Self {
            profile: profile.to_string(),
            datetime: Some("2024-03-05".to_string()),
            slides,
            wraps: false,
        }
    }

    pub fn wrapping(mut self) -> Self {
        self.wraps = true;
        self
    }
}

struct Inner {
    items: Vec<ItemSpec>,
    slide: RefCell<Vec<usize>>,
    focused: Cell<Option<usize>>,
    /// Past the last item, focus is lost instead of staying put.
    lose_focus_at_end: bool,
    clicks: Cell<usize>,
    keys: RefCell<Vec<String>>,
    recordings: Cell<usize>,
    sel: SelectorSet,
}

#[derive(Clone)]
pub struct FakePage {
    inner: Rc<Inner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node {
    Item(usize),
    Profile(usize),
    Time(usize),
    Next(usize),
    Media { item: usize, slide: usize, n: usize },
}

#[derive(Clone)]
pub struct FakeElement {
    inner: Rc<Inner>,
    node: Node,
}

impl FakePage {
    pub fn new(items: Vec<ItemSpec>) -> Self {
        Self::build(items, false)
    }

    pub fn losing_focus_at_end(items: Vec<ItemSpec>) -> Self {
        Self::build(items, true)
    }

    fn build(items: Vec<ItemSpec>, lose_focus_at_end: bool) -> Self {
        let slide = vec![0; items.len()];
        let focused = if items.is_empty() { None } else { Some(0) };
        Self {
            inner: Rc::new(Inner {
                items,
                slide: RefCell::new(slide),
                focused: Cell::new(focused),
                lose_focus_at_end,
                clicks: Cell::new(0),
                keys: RefCell::new(Vec::new()),
                recordings: Cell::new(0),
                sel: SelectorSet::default(),
            }),
        }
    }

    pub fn clicks(&self) -> usize {
        self.inner.clicks.get()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.keys.borrow().clone()
    }

    pub fn recordings(&self) -> usize {
        self.inner.recordings.get()
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.inner.focused.get()
    }

    pub fn current_slide(&self, item: usize) -> usize {
        self.inner.slide.borrow()[item]
    }

    fn element(&self, node: Node) -> FakeElement {
        FakeElement {
            inner: Rc::clone(&self.inner),
            node,
        }
    }
}

impl Inner {
    fn media(&self, item: usize, slide: usize, n: usize) -> Option<&Media> {
        self.items.get(item)?.slides.get(slide)?.get(n)
    }

    fn has_next(&self, item: usize) -> bool {
        let spec = &self.items[item];
        spec.wraps || self.slide.borrow()[item] + 1 < spec.slides.len()
    }

    fn video_capture(&self, url: &str) -> Option<VideoCapture> {
        self.items
            .iter()
            .flat_map(|i| i.slides.iter().flatten())
            .find_map(|m| match m {
                Media::Video { src, capture, .. } if src == url => Some(*capture),
                _ => None,
            })
    }
}

impl Document for FakePage {
    type Element = FakeElement;

    fn select_all(&self, selector: &str) -> Vec<FakeElement> {
        let sel = &self.inner.sel;
        if selector == sel.focused_item {
            self.inner
                .focused
                .get()
                .map(|i| vec![self.element(Node::Item(i))])
                .unwrap_or_default()
        } else if selector == sel.item {
            (0..self.inner.items.len())
                .map(|i| self.element(Node::Item(i)))
                .collect()
        } else {
            Vec::new()
        }
    }

    fn dispatch_key(&self, key: &str) {
        self.inner.keys.borrow_mut().push(key.to_string());
        if key != self.inner.sel.next_item_key {
            return;
        }
        if let Some(i) = self.inner.focused.get() {
            if i + 1 < self.inner.items.len() {
                self.inner.focused.set(Some(i + 1));
            } else if self.inner.lose_focus_at_end {
                self.inner.focused.set(None);
            }
        }
    }

    fn fetch_ephemeral(&self, url: &str) -> Result<CapturedMedia, CaptureError> {
        match self.inner.video_capture(url) {
            Some(VideoCapture::Fetch) => Ok(CapturedMedia::new(b"fetched-video".to_vec(), "video/mp4")),
            _ => Err(CaptureError::Revoked(url.to_string())),
        }
    }
}

impl FakeElement {
    fn child(&self, node: Node) -> FakeElement {
        FakeElement {
            inner: Rc::clone(&self.inner),
            node,
        }
    }

    fn media(&self) -> Option<&Media> {
        match self.node {
            Node::Media { item, slide, n } => self.inner.media(item, slide, n),
            _ => None,
        }
    }

    fn capture(&self) -> Option<VideoCapture> {
        match self.media()? {
            Media::Video { capture, .. } => Some(*capture),
            Media::Image { .. } => None,
        }
    }

    fn current_media(&self, item: usize, want_video: bool) -> Vec<FakeElement> {
        let slide = self.inner.slide.borrow()[item];
        let Some(media) = self.inner.items[item].slides.get(slide) else {
            return Vec::new();
        };
        media
            .iter()
            .enumerate()
            .filter(|(_, m)| matches!(m, Media::Video { .. }) == want_video)
            .map(|(n, _)| self.child(Node::Media { item, slide, n }))
            .collect()
    }
}

impl Element for FakeElement {
    fn key(&self) -> NodeKey {
        let mut h = DefaultHasher::new();
        self.node.hash(&mut h);
        NodeKey(h.finish())
    }

    fn select_all(&self, selector: &str) -> Vec<FakeElement> {
        let Node::Item(i) = self.node else {
            return Vec::new();
        };
        let sel = &self.inner.sel;
        if selector == sel.image {
            self.current_media(i, false)
        } else if selector == sel.video {
            self.current_media(i, true)
        } else if selector == sel.profile_name {
            vec![self.child(Node::Profile(i))]
        } else if selector == sel.publish_time {
            match self.inner.items[i].datetime {
                Some(_) => vec![self.child(Node::Time(i))],
                None => Vec::new(),
            }
        } else if selector == sel.next_slide {
            vec![self.child(Node::Next(i))]
        } else {
            Vec::new()
        }
    }

    fn attr(&self, name: &str) -> Option<String> {
        match (self.node, name) {
            (Node::Time(i), "datetime") => self.inner.items[i].datetime.clone(),
            (Node::Next(_), "aria-label") => Some("Next".to_string()),
            (Node::Media { .. }, _) => match (self.media()?, name) {
                (Media::Image { src, .. }, "src") | (Media::Video { src, .. }, "src") => Some(src.clone()),
                (Media::Video { poster, .. }, "poster") => poster.clone(),
                _ => None,
            },
            _ => None,
        }
    }

    fn text(&self) -> String {
        match self.node {
            Node::Profile(i) => self.inner.items[i].profile.clone(),
            _ => String::new(),
        }
    }

    fn natural_height(&self) -> u32 {
        match self.media() {
            Some(Media::Image { height, .. }) => *height,
            _ => 0,
        }
    }

    fn is_rendered(&self) -> bool {
        match self.node {
            Node::Next(i) => self.inner.has_next(i),
            _ => self.is_connected(),
        }
    }

    fn is_connected(&self) -> bool {
        match self.node {
            Node::Media { item, slide, .. } => self.inner.slide.borrow()[item] == slide,
            _ => true,
        }
    }

    fn click(&self) {
        self.inner.clicks.set(self.inner.clicks.get() + 1);
        if let Node::Next(i) = self.node {
            let last = self.inner.items[i].slides.len().saturating_sub(1);
            let mut slides = self.inner.slide.borrow_mut();
            slides[i] = (slides[i] + 1).min(last);
        }
    }

    fn ready_state(&self) -> ReadyState {
        match self.media() {
            Some(Media::Video { ready, .. }) => *ready,
            _ => ReadyState::HaveNothing,
        }
    }

    fn capture_source(&self) -> Result<CapturedMedia, CaptureError> {
        match self.capture() {
            Some(VideoCapture::Direct) => Ok(CapturedMedia::new(b"direct-video".to_vec(), "video/mp4")),
            _ => Err(CaptureError::Unsupported),
        }
    }

    fn start_recording(&self) -> Result<(), CaptureError> {
        match self.capture() {
            Some(VideoCapture::Record) => {
                self.inner.recordings.set(self.inner.recordings.get() + 1);
                Ok(())
            }
            _ => Err(CaptureError::Unsupported),
        }
    }

    fn stop_recording(&self) -> Result<CapturedMedia, CaptureError> {
        match self.capture() {
            Some(VideoCapture::Record) => Ok(CapturedMedia::new(b"recorded-clip".to_vec(), "video/webm")),
            _ => Err(CaptureError::Unsupported),
        }
    }

    fn rasterize_frame(&self) -> Result<CapturedMedia, CaptureError> {
        match self.capture() {
            Some(VideoCapture::Raster) => Ok(CapturedMedia::new(b"\x89PNG-frame".to_vec(), "image/png")),
            _ => Err(CaptureError::Failed("tainted canvas".to_string())),
        }
    }
}
