//! URL shape classification for the verification fan-out.

use url::Url;

/// How a link is verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// Video page; its thumbnail stands in for scraped images.
    Video { id: String },
    General,
}

impl LinkKind {
    pub fn classify(link: &str) -> Self {
        match youtube_id(link) {
            Some(id) => LinkKind::Video { id },
            None => LinkKind::General,
        }
    }

    pub fn is_rich(&self) -> bool {
        matches!(self, LinkKind::Video { .. })
    }
}

fn valid_id(id: &str) -> Option<String> {
    let ok = !id.is_empty()
        && id.len() <= 32
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    ok.then(|| id.to_string())
}

/// Video id of `youtube.com/watch?v=`, `youtu.be/<id>` and `youtube.com/shorts/<id>` links.
pub fn youtube_id(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
    let mut segments = url.path_segments()?;
    match host {
        "youtu.be" => valid_id(segments.next()?),
        "youtube.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .and_then(|(_, v)| valid_id(&v)),
            "shorts" => valid_id(segments.next()?),
            _ => None,
        },
        _ => None,
    }
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_video_shapes() {
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_id("https://youtu.be/abc_123").as_deref(), Some("abc_123"));
        assert_eq!(
            youtube_id("https://youtube.com/shorts/XyZ-9").as_deref(),
            Some("XyZ-9")
        );
        assert!(youtube_id("https://www.youtube.com/channel/UC123").is_none());
        assert!(youtube_id("https://example.com/watch?v=abc").is_none());
        assert!(youtube_id("not a url").is_none());
    }

    #[test]
    fn classify_and_thumbnail() {
        assert!(LinkKind::classify("https://youtu.be/abc").is_rich());
        assert_eq!(LinkKind::classify("https://blog.rust-lang.org/"), LinkKind::General);
        assert_eq!(
            thumbnail_url("abc"),
            "https://img.youtube.com/vi/abc/maxresdefault.jpg"
        );
    }
}
