//! Destination naming for acquired media.
//!
//! File names are `{profile}_{captureMillis}_{index}_{dd-MM-yyyy}[_thumbnail|_video].{ext}`;
//! the folder layout comes from settings. Collisions are left to the sink.

mod extension;
mod sanitize;

pub use extension::{extension_from_mime, extension_from_url};
pub use sanitize::sanitize_component;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::media::MediaKind;

/// How destinations are grouped under the download root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderLayout {
    /// `profile/{images|videos|video_thumbnails}/file`
    #[default]
    Profile,
    /// `dd-MM-yyyy/{images|videos|video_thumbnails}/file`
    Date,
    /// `file`
    Flat,
}

/// `dd-MM-yyyy`.
pub fn format_item_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Everything needed to name one acquisition except the extension, which
/// depends on the strategy that produced the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaName {
    pub profile: String,
    pub captured_at_ms: i64,
    /// Seen-set size at acquisition (1-based within the item).
    pub index: usize,
    pub item_date: NaiveDate,
    pub kind: MediaKind,
}

impl MediaName {
    fn safe_profile(&self) -> String {
        let profile = sanitize_component(&self.profile);
        if profile.is_empty() {
            crate::item::FALLBACK_PROFILE.to_string()
        } else {
            profile
        }
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "{}_{}_{}_{}{}.{}",
            self.safe_profile(),
            self.captured_at_ms,
            self.index,
            format_item_date(self.item_date),
            self.kind.suffix(),
            extension
        )
    }

    /// Destination relative to the download root.
    pub fn destination(&self, layout: FolderLayout, extension: &str) -> PathBuf {
        let file = self.file_name(extension);
        match layout {
            FolderLayout::Profile => PathBuf::from(self.safe_profile())
                .join(self.kind.folder())
                .join(file),
            FolderLayout::Date => PathBuf::from(format_item_date(self.item_date))
                .join(self.kind.folder())
                .join(file),
            FolderLayout::Flat => PathBuf::from(file),
        }
    }
}
