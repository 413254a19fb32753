//! `feedgrab scan <session>` – list located media without downloading.

use anyhow::Result;
use feedgrab_core::config::FeedgrabConfig;
use feedgrab_core::dom::Document;
use feedgrab_core::item::FeedItem;
use feedgrab_core::media::MediaLocator;
use feedgrab_core::snapshot::SnapshotSession;
use std::path::Path;

pub fn run_scan(cfg: &FeedgrabConfig, session_dir: &Path) -> Result<()> {
    cfg.validate()?;
    let session = SnapshotSession::open(session_dir)?;
    let locator = MediaLocator::new(&cfg.selectors, cfg.traversal.min_image_height);

    let items = session.select_all(&cfg.selectors.item);
    if items.is_empty() {
        println!("No feed items in the first page state.");
        return Ok(());
    }
    for el in items {
        let item = FeedItem::resolve(el, &cfg.selectors);
        let refs = locator.locate(&item.element);
        println!("{} ({}) – {} media", item.profile, item.date, refs.len());
        for r in refs {
            let kind = format!("{:?}", r.kind).to_lowercase();
            let flag = if r.ephemeral { " (in-page)" } else { "" };
            println!("  {:<10} {}{}", kind, r.url, flag);
        }
    }
    Ok(())
}
