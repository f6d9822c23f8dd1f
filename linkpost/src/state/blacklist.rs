//! URL shapes that never make useful source links or image candidates.
//!
//! Source links only need to be fetchable web pages. Image candidates additionally
//! reject icons, logos and tracking pixels, matched on whole path words so that an
//! article about e.g. the Pixel phone is not mistaken for a tracking pixel.

use once_cell::sync::Lazy;
use url::Url;

use crate::channels::UrlFilter;

/// Lower-case suffixes rejected on image paths.
const BLOCKED_IMAGE_EXTENSIONS: &[&str] = &[".svg", ".ico", ".gif"];

/// Lower-case words rejected when they appear as a whole word of an image path.
const BLOCKED_IMAGE_WORDS: &[&str] = &[
    "favicon", "logo", "avatar", "avatars", "badge", "sprite", "pixel", "tracking",
];

/// Image hosts that only serve profile pictures.
const BLOCKED_IMAGE_HOSTS: &[&str] = &["gravatar.com"];

static LINK_FILTER: Lazy<UrlFilter> = Lazy::new(|| UrlFilter::new(is_allowed_link));
static IMAGE_FILTER: Lazy<UrlFilter> = Lazy::new(|| UrlFilter::new(is_allowed_image_url));

fn parse_web_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => Some(url),
        _ => None,
    }
}

/// Whether `url` can be a source link: an absolute http(s) URL with a host.
pub fn is_allowed_link(url: &str) -> bool {
    parse_web_url(url).is_some()
}

/// Whether `url` can be an image candidate.
pub fn is_allowed_image_url(url: &str) -> bool {
    let Some(parsed) = parse_web_url(url) else {
        return false;
    };
    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    if BLOCKED_IMAGE_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
    {
        return false;
    }
    let path = parsed.path().to_ascii_lowercase();
    if BLOCKED_IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }
    !path
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| BLOCKED_IMAGE_WORDS.contains(&word))
}

/// Filter for `relevant_links`.
pub fn link_filter() -> UrlFilter {
    LINK_FILTER.clone()
}

/// Filter for `image_candidates`.
pub fn image_filter() -> UrlFilter {
    IMAGE_FILTER.clone()
}
