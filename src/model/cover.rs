//! Cover chapter detection and construction.
//!
//! A cover is a distinguished chapter holding only the book cover image. New
//! covers always carry the explicit `data-cover` marker; detection keeps a
//! structural heuristic as a compatibility fallback because legacy documents
//! predate the marker. The heuristic is load-bearing and must not change:
//! exactly one image, no heading, at most two top-level child elements.

use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Marker attribute carried by every cover body this crate produces.
pub const COVER_MARKER_ATTR: &str = "data-cover";
/// Class applied to the cover image itself.
pub const COVER_IMAGE_CLASS: &str = "book-cover-image";

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid selector"));
static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));
static MARKER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[data-cover=\"true\"], img.book-cover-image").expect("valid selector")
});

/// Build the standard cover body for an image URL.
pub fn cover_body(image_url: &str) -> String {
    format!(
        "<div {COVER_MARKER_ATTR}=\"true\"><img class=\"{COVER_IMAGE_CLASS}\" src=\"{}\"></div>",
        html_escape::encode_double_quoted_attribute(image_url)
    )
}

/// Decide whether a chapter body is a cover.
///
/// The explicit marker wins; bodies without it fall back to the structural
/// heuristic (one image, no heading, at most two top-level children).
pub fn is_cover(body: &str) -> bool {
    let fragment = Html::parse_fragment(body);

    if fragment.select(&MARKER_SELECTOR).next().is_some() {
        return true;
    }

    let top_level = fragment
        .root_element()
        .child_elements()
        .count();
    let images = fragment.select(&IMG_SELECTOR).count();
    let headings = fragment.select(&HEADING_SELECTOR).count();

    images == 1 && headings == 0 && top_level <= 2
}

/// The cover image URL, if the body holds one.
pub fn cover_image_src(body: &str) -> Option<String> {
    let fragment = Html::parse_fragment(body);
    fragment
        .select(&IMG_SELECTOR)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_body_is_cover() {
        let body = "<div data-cover=\"true\"><img src=\"http://x/y.png\" class=\"book-cover-image\"></div>";
        assert!(is_cover(body));
        assert_eq!(cover_image_src(body).as_deref(), Some("http://x/y.png"));
    }

    #[test]
    fn built_body_round_trips_through_detection() {
        let body = cover_body("https://img.example/cover.png");
        assert!(is_cover(&body));
        assert_eq!(
            cover_image_src(&body).as_deref(),
            Some("https://img.example/cover.png")
        );
    }

    #[test]
    fn heuristic_accepts_bare_single_image() {
        assert!(is_cover("<div><img src=\"a.png\"></div>"));
        assert!(is_cover("<p><img src=\"a.png\"></p><p></p>"));
    }

    #[test]
    fn heuristic_rejects_headed_or_busy_bodies() {
        assert!(!is_cover("<h1>Title</h1><img src=\"a.png\">"));
        assert!(!is_cover("<p>a</p><p>b</p><p><img src=\"a.png\"></p>"));
        assert!(!is_cover("<img src=\"a.png\"><img src=\"b.png\">"));
        assert!(!is_cover("<p>just text</p>"));
    }

    #[test]
    fn is_cover_stable_under_json_round_trips() {
        let body = cover_body("https://img.example/cover.png");
        let round_tripped: String =
            serde_json::from_str(&serde_json::to_string(&body).unwrap()).unwrap();
        assert_eq!(is_cover(&body), is_cover(&round_tripped));
        let twice: String =
            serde_json::from_str(&serde_json::to_string(&round_tripped).unwrap()).unwrap();
        assert_eq!(is_cover(&body), is_cover(&twice));
    }
}
