//! Per-item deduplication of media URLs.

use std::collections::HashSet;

/// URLs already enqueued for acquisition within one item traversal.
/// Only grows; dropped when the item's traversal ends.
#[derive(Debug, Default)]
pub struct SeenSet {
    urls: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` seen and returns true on first encounter; false afterwards.
    /// Marking happens before acquisition starts, so a URL is enqueued at most once.
    pub fn should_acquire(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_encounter_only() {
        let mut seen = SeenSet::new();
        assert!(seen.should_acquire("https://cdn/a.jpg"));
        assert!(!seen.should_acquire("https://cdn/a.jpg"));
        assert!(seen.should_acquire("https://cdn/b.jpg"));
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("https://cdn/a.jpg"));
    }
}
