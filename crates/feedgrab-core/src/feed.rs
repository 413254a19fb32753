//! Feed traversal: walk the focused item's carousel, press "next item",
//! and repeat until cancelled, bounded, or the feed stops moving.

use crate::carousel::{CarouselEnd, CarouselWalker};
use crate::control::TraversalControl;
use crate::dom::{Document, Element};
use crate::item::FeedItem;
use crate::sink::DownloadSink;

/// Why a feed traversal ended. All of these are normal terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEnd {
    Cancelled,
    /// `max_posts` items processed.
    LimitReached,
    /// No focused item after navigating.
    NoItem,
    /// Navigation left the same item focused.
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOutcome {
    pub end: FeedEnd,
    pub items: usize,
    /// Distinct media found across all items.
    pub found: usize,
    pub acquired: usize,
    pub failed: usize,
}

pub struct FeedDriver<'a, D, S> {
    walker: CarouselWalker<'a, D, S>,
}

impl<'a, D: Document, S: DownloadSink> FeedDriver<'a, D, S> {
    pub fn new(walker: CarouselWalker<'a, D, S>) -> Self {
        Self { walker }
    }

    pub fn walker(&self) -> &CarouselWalker<'a, D, S> {
        &self.walker
    }

    /// The item currently in focus, if any.
    pub fn focused_item(&self) -> Option<D::Element> {
        self.walker
            .document()
            .select_first(&self.walker.config().selectors.focused_item)
    }

    pub async fn run(&self, start: D::Element, control: &TraversalControl) -> FeedOutcome {
        let config = self.walker.config();
        let doc = self.walker.document();
        let bound = config.settings.effective_max_posts();
        let mut outcome = FeedOutcome {
            end: FeedEnd::Cancelled,
            items: 0,
            found: 0,
            acquired: 0,
            failed: 0,
        };
        let mut current = start;

        let end = loop {
            let item = FeedItem::resolve(current.clone(), &config.selectors);
            tracing::info!(
                profile = %item.profile,
                date = %item.date,
                "item {}/{}",
                outcome.items + 1,
                bound
            );
            let carousel = self.walker.walk(&item, control).await;
            // An item stopped before its first scan was never visited.
            if carousel.scans > 0 {
                outcome.items += 1;
                outcome.found += carousel.found;
                outcome.acquired += carousel.acquired;
                outcome.failed += carousel.failed;
                self.walker.tally().item_done();
            }

            if carousel.end == CarouselEnd::Cancelled || control.is_cancelled() {
                break FeedEnd::Cancelled;
            }
            if outcome.items >= bound {
                break FeedEnd::LimitReached;
            }

            doc.dispatch_key(&config.selectors.next_item_key);
            tokio::time::sleep(config.traversal.item_settle()).await;

            match doc.select_first(&config.selectors.focused_item) {
                None => break FeedEnd::NoItem,
                Some(next) if next.key() == current.key() => break FeedEnd::Stalled,
                Some(next) => current = next,
            }
        };

        outcome.end = end;
        tracing::info!(
            ?end,
            items = outcome.items,
            acquired = outcome.acquired,
            failed = outcome.failed,
            "feed traversal finished"
        );
        outcome
    }
}
