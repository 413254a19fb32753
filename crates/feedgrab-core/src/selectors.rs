//! Page contract: every selector and pattern the core uses against the feed DOM.
//!
//! The feed page is third-party markup that changes without notice, so all of
//! it lives here and can be overridden from the `[selectors]` config section.

use serde::{Deserialize, Serialize};

/// Error returned by [`SelectorSet::validate`].
#[derive(Debug, thiserror::Error)]
#[error("invalid selector for `{field}`: {selector}")]
pub struct SelectorError {
    pub field: &'static str,
    pub selector: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    /// Every rendered feed item (post).
    pub item: String,
    /// The item currently focused after a "next item" navigation.
    pub focused_item: String,
    /// Element whose text is the profile name, searched within an item.
    pub profile_name: String,
    /// Element carrying the machine-readable publish time in `datetime`.
    pub publish_time: String,
    pub image: String,
    pub video: String,
    /// "Next slide" control inside a carousel. Includes localized labels.
    pub next_slide: String,
    /// Substring identifying the platform's media CDN host.
    pub cdn_pattern: String,
    /// URL prefix of in-page ephemeral media references.
    pub ephemeral_scheme: String,
    /// Key dispatched to advance the feed to the next item.
    pub next_item_key: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            item: "article".to_string(),
            focused_item: r#"article[role="presentation"]"#.to_string(),
            profile_name: r#"header a span, a[role="link"] span"#.to_string(),
            publish_time: "time".to_string(),
            image: "img".to_string(),
            video: "video".to_string(),
            next_slide: r#"button[aria-label="Next"], button[aria-label="Weiter"]"#.to_string(),
            cdn_pattern: "cdninstagram".to_string(),
            ephemeral_scheme: "blob:".to_string(),
            next_item_key: "ArrowRight".to_string(),
        }
    }
}

impl SelectorSet {
    /// Parse every CSS selector; reports the first one that does not parse.
    pub fn validate(&self) -> Result<(), SelectorError> {
        let fields: [(&'static str, &str); 7] = [
            ("item", &self.item),
            ("focused_item", &self.focused_item),
            ("profile_name", &self.profile_name),
            ("publish_time", &self.publish_time),
            ("image", &self.image),
            ("video", &self.video),
            ("next_slide", &self.next_slide),
        ];
        for (field, selector) in fields {
            if scraper::Selector::parse(selector).is_err() {
                return Err(SelectorError {
                    field,
                    selector: selector.to_string(),
                });
            }
        }
        Ok(())
    }

    /// True if `url` points at the platform media CDN.
    pub fn is_cdn_url(&self, url: &str) -> bool {
        !url.is_empty() && url.contains(&self.cdn_pattern)
    }

    /// True if `url` is an in-page ephemeral reference (e.g. `blob:`).
    pub fn is_ephemeral_url(&self, url: &str) -> bool {
        url.starts_with(&self.ephemeral_scheme)
    }
}
