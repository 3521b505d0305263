use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // share tracking suffix appended by the mobile apps
    static ref SHARE_SUFFIX: Regex = Regex::new(r"\?si=.*").unwrap();
    static ref VIDEO_URL: Regex = Regex::new(
        r"^.*((youtu.be/)|(v/)|(/u/[A-Za-z0-9_]/)|(embed/)|(watch\?))\??v?=?([^#&?]*).*"
    )
    .unwrap();
}

const VIDEO_ID_LEN: usize = 11;

/// Extract the 11-character video id from a watch, short, embed or `/v/` url.
pub fn video_id(url: &str) -> Option<String> {
    let url = SHARE_SUFFIX.replace(url, "");
    let id = VIDEO_URL.captures(&url)?.get(7)?.as_str();

    (id.chars().count() == VIDEO_ID_LEN).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn common_url_shapes_resolve_to_the_same_id() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=Xy12abc",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ#comments",
        ] {
            assert_eq!(video_id(url).as_deref(), Some(ID), "url: {url}");
        }
    }

    #[test]
    fn unrecognised_urls_do_not_resolve() {
        for url in [
            "not-a-url",
            "",
            "https://example.com/dQw4w9WgXcQ",
            "https://youtu.be/short",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQextra",
        ] {
            assert_eq!(video_id(url), None, "url: {url}");
        }
    }
}
