//! Representative media selection for output items.

use crate::feed::SourceEntry;
use crate::html::absolutize;

/// MIME type assumed when nothing better is declared or guessable.
const DEFAULT_MIME: &str = "image/jpeg";

/// One media resource attached to an output item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub url: String,
    pub mime_type: String,
}

/// Choose at most one media resource for an entry.
///
/// The first declared enclosure wins, with its URL absolutized and its
/// declared type kept (guessed from the URL when absent). Otherwise the
/// body's first image, with a guessed type. An entry without media is
/// `None`, not an error.
pub fn select_media(
    entry: &SourceEntry,
    first_image: Option<&str>,
    site_base: &str,
) -> Option<MediaAsset> {
    let base = entry.link.as_deref().unwrap_or(site_base);

    if let Some(enclosure) = entry.enclosures.first() {
        let url = absolutize(&enclosure.url, base);
        let mime_type = enclosure
            .mime_type
            .clone()
            .filter(|declared| !declared.is_empty())
            .unwrap_or_else(|| guess_mime(&url).to_string());
        return Some(MediaAsset { url, mime_type });
    }

    first_image.map(|url| MediaAsset {
        url: url.to_string(),
        mime_type: guess_mime(url).to_string(),
    })
}

/// Guess a MIME type from the URL's file extension.
fn guess_mime(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        Some("bmp") => "image/bmp",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => DEFAULT_MIME,
    }
}
