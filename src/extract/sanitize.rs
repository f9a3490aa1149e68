//! Chapter body sanitization.
//!
//! Chapter HTML comes from an external editor and an external generation
//! service, so it is treated as hostile. Before any node extraction runs the
//! body loses `<script>` elements, every `on*` event attribute, and any
//! `href`/`src` pointing at a `javascript:` URL.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<script\b[^>]*/\s*>").expect("valid regex")
});

static EVENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid regex")
});

static JS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\s+(?:href|src)\s*=\s*(?:"\s*javascript:[^"]*"|'\s*javascript:[^']*'|javascript:[^\s>]+)"#,
    )
    .expect("valid regex")
});

/// Strip unsafe content from a chapter body.
pub fn sanitize(html: &str) -> String {
    let html = SCRIPT_RE.replace_all(html, "");
    let html = EVENT_ATTR_RE.replace_all(&html, "");
    let html = JS_URL_RE.replace_all(&html, "");
    html.into_owned()
}
