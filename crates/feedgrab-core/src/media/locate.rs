//! Media Locator: pure read of an item's current DOM state.

use super::MediaReference;
use crate::dom::Element;
use crate::selectors::SelectorSet;

/// Finds candidate media under a feed item. No network I/O; the result is
/// deterministic for a fixed DOM snapshot.
#[derive(Debug, Clone)]
pub struct MediaLocator<'a> {
    selectors: &'a SelectorSet,
    /// Images shorter than this are avatars/icons and skipped.
    min_image_height: u32,
}

impl<'a> MediaLocator<'a> {
    pub fn new(selectors: &'a SelectorSet, min_image_height: u32) -> Self {
        Self {
            selectors,
            min_image_height,
        }
    }

    /// Images in document order, then for each video its poster and its
    /// ephemeral source (zero, one, or two references per video).
    pub fn locate<E: Element>(&self, item: &E) -> Vec<MediaReference<E>> {
        let mut found = Vec::new();

        for img in item.select_all(&self.selectors.image) {
            let Some(src) = img.attr("src") else { continue };
            if !self.selectors.is_cdn_url(&src) {
                continue;
            }
            if img.natural_height() < self.min_image_height {
                continue;
            }
            found.push(MediaReference::image(src));
        }

        for video in item.select_all(&self.selectors.video) {
            let poster = video
                .attr("poster")
                .filter(|p| self.selectors.is_cdn_url(p));
            if let Some(p) = &poster {
                found.push(MediaReference::thumbnail(p.clone(), Some(video.clone())));
            }
            if let Some(src) = video.attr("src").filter(|s| self.selectors.is_ephemeral_url(s)) {
                found.push(MediaReference::ephemeral_video(src, poster, Some(video.clone())));
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::media::MediaKind;
    use crate::snapshot::SnapshotSession;

    const POST: &str = r#"
        <html><body>
        <article role="presentation">
          <header><a href="/alice"><span>alice</span></a></header>
          <img src="https://scontent.cdninstagram.com/avatar.jpg" data-natural-height="150">
          <img src="https://scontent.cdninstagram.com/p/one.jpg" data-natural-height="1080">
          <img src="https://static.example.com/banner.jpg" height="900">
          <img src="https://scontent.cdninstagram.com/p/two.webp" height="400">
          <video poster="https://scontent.cdninstagram.com/p/poster.jpg" src="blob:https://www.instagram.com/abc"></video>
          <video src="https://video.example.com/plain.mp4"></video>
        </article>
        </body></html>"#;

    #[test]
    fn locates_images_posters_and_ephemeral_sources() {
        let session = SnapshotSession::from_pages(vec![POST.to_string()]);
        let sel = SelectorSet::default();
        let item = session.select_first(&sel.focused_item).unwrap();
        let refs = MediaLocator::new(&sel, 400).locate(&item);

        let urls: Vec<&str> = refs.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://scontent.cdninstagram.com/p/one.jpg",
                "https://scontent.cdninstagram.com/p/two.webp",
                "https://scontent.cdninstagram.com/p/poster.jpg",
                "blob:https://www.instagram.com/abc",
            ]
        );
        assert_eq!(refs[2].kind, MediaKind::Thumbnail);
        assert_eq!(refs[3].kind, MediaKind::Video);
        assert!(refs[3].ephemeral);
        assert_eq!(
            refs[3].poster.as_deref(),
            Some("https://scontent.cdninstagram.com/p/poster.jpg")
        );
        assert!(refs[3].element.is_some());
    }

    #[test]
    fn height_threshold_is_configurable() {
        let session = SnapshotSession::from_pages(vec![POST.to_string()]);
        let sel = SelectorSet::default();
        let item = session.select_first(&sel.focused_item).unwrap();
        let images = MediaLocator::new(&sel, 100)
            .locate(&item)
            .into_iter()
            .filter(|r| r.kind == MediaKind::Image)
            .count();
        assert_eq!(images, 3);
    }

    #[test]
    fn item_without_media_yields_nothing() {
        let html = "<article role=\"presentation\"><p>text only</p></article>";
        let session = SnapshotSession::from_pages(vec![html.to_string()]);
        let sel = SelectorSet::default();
        let item = session.select_first(&sel.focused_item).unwrap();
        assert!(MediaLocator::new(&sel, 400).locate(&item).is_empty());
    }
}
