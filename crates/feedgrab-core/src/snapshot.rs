//! Recorded session: a feed replayed from saved HTML page states.
//!
//! A session directory holds one `.html` file per feed position, sorted by
//! file name. Dispatching the next-item key moves to the following state;
//! at the last state it has no effect, which the feed driver sees as the end
//! of the feed. Snapshots are static: clicks change nothing and nothing
//! in-memory can be captured.

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::dom::{Document, Element, NodeKey};

struct Inner {
    pages: Vec<Html>,
    current: Cell<usize>,
    clicks: Cell<usize>,
    next_item_key: String,
}

/// Document backed by a sequence of parsed HTML page states.
#[derive(Clone)]
pub struct SnapshotSession {
    inner: Rc<Inner>,
}

/// Handle to one node of one page state.
#[derive(Clone)]
pub struct SnapshotElement {
    inner: Rc<Inner>,
    page: usize,
    node: ego_tree::NodeId,
}

impl SnapshotSession {
    /// Load every `*.html` / `*.htm` file in `dir`, in file-name order.
    pub fn open(dir: &Path) -> Result<Self> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("read session dir: {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
            })
            .collect();
        files.sort();
        if files.is_empty() {
            anyhow::bail!("no .html page states in {}", dir.display());
        }
        let mut pages = Vec::with_capacity(files.len());
        for path in &files {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read page state: {}", path.display()))?;
            pages.push(raw);
        }
        tracing::debug!(dir = %dir.display(), states = pages.len(), "loaded recorded session");
        Ok(Self::from_pages(pages))
    }

    /// Build a session from in-memory HTML page states.
    pub fn from_pages(pages: Vec<String>) -> Self {
        let pages = pages.iter().map(|p| Html::parse_document(p)).collect();
        Self {
            inner: Rc::new(Inner {
                pages,
                current: Cell::new(0),
                clicks: Cell::new(0),
                next_item_key: "ArrowRight".to_string(),
            }),
        }
    }

    /// Use a different key for "next item" navigation. Call before sharing the session.
    pub fn with_next_item_key(self, key: &str) -> Self {
        match Rc::try_unwrap(self.inner) {
            Ok(mut inner) => {
                inner.next_item_key = key.to_string();
                Self {
                    inner: Rc::new(inner),
                }
            }
            Err(inner) => Self { inner },
        }
    }

    pub fn page_count(&self) -> usize {
        self.inner.pages.len()
    }

    /// Index of the page state currently shown.
    pub fn current_page(&self) -> usize {
        self.inner.current.get()
    }

    /// Number of simulated clicks received so far.
    pub fn clicks(&self) -> usize {
        self.inner.clicks.get()
    }

    fn wrap_all<'a>(&self, page: usize, matches: impl Iterator<Item = ElementRef<'a>>) -> Vec<SnapshotElement> {
        matches
            .map(|el| SnapshotElement {
                inner: Rc::clone(&self.inner),
                page,
                node: el.id(),
            })
            .collect()
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(selector, "unparseable selector: {:?}", e);
            None
        }
    }
}

impl Document for SnapshotSession {
    type Element = SnapshotElement;

    fn select_all(&self, selector: &str) -> Vec<SnapshotElement> {
        let Some(sel) = parse_selector(selector) else {
            return Vec::new();
        };
        let page = self.inner.current.get();
        match self.inner.pages.get(page) {
            Some(html) => self.wrap_all(page, html.select(&sel)),
            None => Vec::new(),
        }
    }

    fn dispatch_key(&self, key: &str) {
        if key != self.inner.next_item_key {
            tracing::trace!(key, "ignoring key");
            return;
        }
        let current = self.inner.current.get();
        if current + 1 < self.inner.pages.len() {
            self.inner.current.set(current + 1);
            tracing::trace!(from = current, to = current + 1, "advanced page state");
        }
    }
}

impl SnapshotElement {
    fn element_ref(&self) -> Option<ElementRef<'_>> {
        let node = self.inner.pages.get(self.page)?.tree.get(self.node)?;
        ElementRef::wrap(node)
    }
}

fn is_hidden(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    value.attr("style").is_some_and(|style| {
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        compact.to_ascii_lowercase().contains("display:none")
    })
}

impl Element for SnapshotElement {
    fn key(&self) -> NodeKey {
        let mut hasher = DefaultHasher::new();
        self.page.hash(&mut hasher);
        self.node.hash(&mut hasher);
        NodeKey(hasher.finish())
    }

    fn select_all(&self, selector: &str) -> Vec<SnapshotElement> {
        let Some(sel) = parse_selector(selector) else {
            return Vec::new();
        };
        let Some(el) = self.element_ref() else {
            return Vec::new();
        };
        el.select(&sel)
            .map(|m| SnapshotElement {
                inner: Rc::clone(&self.inner),
                page: self.page,
                node: m.id(),
            })
            .collect()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.element_ref()?.value().attr(name).map(str::to_string)
    }

    fn text(&self) -> String {
        self.element_ref()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
    }

    /// Saved pages carry no layout, so the height comes from `height` or the
    /// `data-natural-height` attribute written by the capture tool.
    fn natural_height(&self) -> u32 {
        ["height", "data-natural-height"]
            .iter()
            .find_map(|name| self.attr(name).and_then(|v| v.trim().parse::<u32>().ok()))
            .unwrap_or(0)
    }

    fn is_rendered(&self) -> bool {
        if !self.is_connected() {
            return false;
        }
        let Some(el) = self.element_ref() else {
            return false;
        };
        if is_hidden(&el) {
            return false;
        }
        !el.ancestors().filter_map(ElementRef::wrap).any(|a| is_hidden(&a))
    }

    fn is_connected(&self) -> bool {
        self.page == self.inner.current.get()
    }

    fn click(&self) {
        self.inner.clicks.set(self.inner.clicks.get() + 1);
        tracing::trace!(page = self.page, "click on static snapshot");
    }
}
