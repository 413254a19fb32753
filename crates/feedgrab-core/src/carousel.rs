//! Carousel traversal: scan the item, advance one slide, scan again.
//!
//! Ends when the next-slide control is gone or hidden, when `max_empty_scans`
//! consecutive scans after an advance turn up nothing new (platforms that wrap
//! the last slide keep the control visible forever), or on cancellation. The
//! opening scan never counts as a strike.

use chrono::Utc;

use crate::acquire::Acquirer;
use crate::config::FeedgrabConfig;
use crate::control::TraversalControl;
use crate::dom::{Document, Element};
use crate::item::FeedItem;
use crate::media::{MediaKind, MediaLocator, MediaReference};
use crate::naming::MediaName;
use crate::seen::SeenSet;
use crate::sink::DownloadSink;
use crate::stats::RunTally;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselState {
    Idle,
    Scanning { slide: usize },
    Advancing { slide: usize },
    Done(CarouselEnd),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselEnd {
    /// No rendered next-slide control.
    NoNextControl,
    /// Too many consecutive scans without new media.
    Exhausted,
    Cancelled,
}

/// Result of walking one item's carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselOutcome {
    pub end: CarouselEnd,
    /// Scans performed (one per visited slide).
    pub scans: usize,
    /// Distinct media references discovered.
    pub found: usize,
    pub acquired: usize,
    pub failed: usize,
}

impl CarouselOutcome {
    fn new() -> Self {
        Self {
            end: CarouselEnd::NoNextControl,
            scans: 0,
            found: 0,
            acquired: 0,
            failed: 0,
        }
    }
}

enum Scan {
    Finished { new: usize },
    Cancelled,
}

/// Walks carousels against one page, acquiring through one sink.
pub struct CarouselWalker<'a, D, S> {
    doc: &'a D,
    acquirer: Acquirer<'a, D, S>,
    config: &'a FeedgrabConfig,
    tally: &'a RunTally,
}

impl<'a, D: Document, S: DownloadSink> CarouselWalker<'a, D, S> {
    pub fn new(doc: &'a D, sink: &'a S, config: &'a FeedgrabConfig, tally: &'a RunTally) -> Self {
        Self {
            doc,
            acquirer: Acquirer::new(doc, sink, &config.capture, config.settings.folder_structure, tally),
            config,
            tally,
        }
    }

    pub fn document(&self) -> &'a D {
        self.doc
    }

    pub fn config(&self) -> &'a FeedgrabConfig {
        self.config
    }

    pub fn tally(&self) -> &'a RunTally {
        self.tally
    }

    fn wanted(&self, reference: &MediaReference<D::Element>) -> bool {
        let settings = &self.config.settings;
        match reference.kind {
            MediaKind::Image => true,
            MediaKind::Video => settings.download_videos,
            MediaKind::Thumbnail => settings.download_thumbnails,
        }
    }

    /// Walk every slide of `item`. The seen set lives and dies with this call.
    pub async fn walk(&self, item: &FeedItem<D::Element>, control: &TraversalControl) -> CarouselOutcome {
        let traversal = &self.config.traversal;
        let locator = MediaLocator::new(&self.config.selectors, traversal.min_image_height);
        let mut seen = SeenSet::new();
        let mut outcome = CarouselOutcome::new();
        let mut strikes = 0u32;
        let mut state = CarouselState::Idle;

        loop {
            tracing::trace!(?state, profile = %item.profile, "carousel");
            state = match state {
                CarouselState::Idle => CarouselState::Scanning { slide: 0 },
                CarouselState::Scanning { slide } => {
                    if control.is_cancelled() {
                        CarouselState::Done(CarouselEnd::Cancelled)
                    } else {
                        outcome.scans += 1;
                        match self.scan(item, &locator, &mut seen, control, &mut outcome).await {
                            Scan::Cancelled => CarouselState::Done(CarouselEnd::Cancelled),
                            Scan::Finished { new } if new > 0 => {
                                strikes = 0;
                                CarouselState::Advancing { slide }
                            }
                            Scan::Finished { .. } if slide == 0 => CarouselState::Advancing { slide },
                            Scan::Finished { .. } => {
                                strikes += 1;
                                tracing::debug!(slide, strikes, "scan found nothing new");
                                if strikes >= traversal.max_empty_scans {
                                    CarouselState::Done(CarouselEnd::Exhausted)
                                } else {
                                    CarouselState::Advancing { slide }
                                }
                            }
                        }
                    }
                }
                CarouselState::Advancing { slide } => {
                    if control.is_cancelled() {
                        CarouselState::Done(CarouselEnd::Cancelled)
                    } else {
                        let next = item
                            .element
                            .select_all(&self.config.selectors.next_slide)
                            .into_iter()
                            .find(|el| el.is_rendered());
                        match next {
                            None => CarouselState::Done(CarouselEnd::NoNextControl),
                            Some(button) => {
                                button.click();
                                tokio::time::sleep(traversal.slide_settle()).await;
                                CarouselState::Scanning { slide: slide + 1 }
                            }
                        }
                    }
                }
                CarouselState::Done(end) => {
                    outcome.end = end;
                    tracing::debug!(
                        profile = %item.profile,
                        ?end,
                        scans = outcome.scans,
                        found = outcome.found,
                        "carousel done"
                    );
                    return outcome;
                }
            };
        }
    }

    async fn scan(
        &self,
        item: &FeedItem<D::Element>,
        locator: &MediaLocator<'_>,
        seen: &mut SeenSet,
        control: &TraversalControl,
        outcome: &mut CarouselOutcome,
    ) -> Scan {
        let mut new = 0usize;
        for reference in locator.locate(&item.element) {
            if !self.wanted(&reference) {
                continue;
            }
            if control.is_cancelled() {
                return Scan::Cancelled;
            }
            if !seen.should_acquire(&reference.url) {
                continue;
            }
            new += 1;
            outcome.found += 1;

            let name = MediaName {
                profile: item.profile.clone(),
                captured_at_ms: Utc::now().timestamp_millis(),
                index: seen.len(),
                item_date: item.date,
                kind: reference.kind,
            };
            match self.acquirer.acquire(&reference, &name).await {
                Ok(_) => outcome.acquired += 1,
                Err(e) => {
                    tracing::warn!(profile = %item.profile, "acquisition failed: {}", e);
                    self.tally.failed();
                    outcome.failed += 1;
                }
            }
            tokio::time::sleep(self.config.traversal.acquire_delay(reference.is_video())).await;
        }
        Scan::Finished { new }
    }
}
