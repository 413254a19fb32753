//! File extension from a media URL or a captured MIME type.

use crate::media::MediaKind;

/// Extension of the URL's last path segment when it is 1–4 ASCII
/// alphanumerics, lowercased; otherwise the kind's default.
pub fn extension_from_url(url: &str, kind: MediaKind) -> String {
    url_extension(url).unwrap_or_else(|| kind.default_extension().to_string())
}

fn url_extension(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 4 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Extension for bytes captured from the page, by MIME type.
pub fn extension_from_mime(mime: &str) -> &'static str {
    let mime = mime.trim().to_ascii_lowercase();
    if mime.contains("video/mp4") {
        "mp4"
    } else if mime.contains("video/webm") {
        "webm"
    } else if mime.contains("video/ogg") {
        "ogv"
    } else if mime.contains("image/jpeg") {
        "jpg"
    } else if mime.contains("image/png") {
        "png"
    } else if mime.contains("image/webp") {
        "webp"
    } else if mime.starts_with("video/") {
        "mp4"
    } else if mime.starts_with("image/") {
        "jpg"
    } else {
        "bin"
    }
}
