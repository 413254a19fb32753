//! Feed item attributes, derived fresh at the start of every item traversal.

use chrono::{DateTime, Local, NaiveDate};

use crate::dom::{Element, NodeKey};
use crate::selectors::SelectorSet;

/// Profile id used when the item shows no profile name.
pub const FALLBACK_PROFILE: &str = "instagram";

/// One rendered post plus the attributes read from it.
#[derive(Debug, Clone)]
pub struct FeedItem<E> {
    pub element: E,
    /// Filesystem-safe profile token.
    pub profile: String,
    /// Publish date in local time (wall clock if the page shows none).
    pub date: NaiveDate,
}

impl<E: Element> FeedItem<E> {
    pub fn resolve(element: E, selectors: &SelectorSet) -> Self {
        let profile = profile_id(&element, selectors);
        let date = publish_date(&element, selectors);
        Self {
            element,
            profile,
            date,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.element.key()
    }
}

/// Text of the profile element with every run of non-word characters
/// replaced by `_`.
pub fn profile_id<E: Element>(item: &E, selectors: &SelectorSet) -> String {
    let raw = item
        .select_first(&selectors.profile_name)
        .map(|el| el.text())
        .unwrap_or_default();
    let token = word_token(raw.trim());
    if token.is_empty() {
        FALLBACK_PROFILE.to_string()
    } else {
        token
    }
}

fn word_token(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_gap = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_gap = false;
        } else if !in_gap {
            out.push('_');
            in_gap = true;
        }
    }
    out
}

/// Local date of the item's `datetime` attribute, or today.
pub fn publish_date<E: Element>(item: &E, selectors: &SelectorSet) -> NaiveDate {
    item.select_first(&selectors.publish_time)
        .and_then(|t| t.attr("datetime"))
        .and_then(|raw| parse_datetime(&raw))
        .unwrap_or_else(|| Local::now().date_naive())
}

fn parse_datetime(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    // Bare dates (`2024-03-05`) carry no zone; take them as-is.
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            tracing::debug!(raw, "unparseable item datetime, using wall clock");
            None
        }
    }
}
