//! Media references found in a feed item and the locator that finds them.

mod locate;

pub use locate::MediaLocator;

/// What a reference points at. Decides folder and file-name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    /// A video's playback source.
    Video,
    /// A video's poster image.
    Thumbnail,
}

impl MediaKind {
    /// Folder used by the `profile` and `date` layouts.
    pub fn folder(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
            MediaKind::Thumbnail => "video_thumbnails",
        }
    }

    /// File-name suffix placed before the extension.
    pub fn suffix(self) -> &'static str {
        match self {
            MediaKind::Image => "",
            MediaKind::Video => "_video",
            MediaKind::Thumbnail => "_thumbnail",
        }
    }

    /// Extension used when the URL does not carry a usable one.
    pub fn default_extension(self) -> &'static str {
        match self {
            MediaKind::Image | MediaKind::Thumbnail => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

/// One piece of media in a feed item. The URL is its identity: two references
/// with the same URL are the same media.
#[derive(Debug, Clone)]
pub struct MediaReference<E> {
    pub kind: MediaKind,
    pub url: String,
    /// Backing bytes exist only in page memory and must be captured while live.
    pub ephemeral: bool,
    /// Poster URL of the originating video, if it has one.
    pub poster: Option<String>,
    /// Originating element; may be unmounted by the time acquisition runs.
    pub element: Option<E>,
}

impl<E> MediaReference<E> {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
            ephemeral: false,
            poster: None,
            element: None,
        }
    }

    pub fn thumbnail(url: impl Into<String>, element: Option<E>) -> Self {
        Self {
            kind: MediaKind::Thumbnail,
            url: url.into(),
            ephemeral: false,
            poster: None,
            element,
        }
    }

    pub fn ephemeral_video(url: impl Into<String>, poster: Option<String>, element: Option<E>) -> Self {
        Self {
            kind: MediaKind::Video,
            url: url.into(),
            ephemeral: true,
            poster,
            element,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}
