use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// `href` attributes only (`<a>`, `<link>`, `<area>`). URLs in `src`, data
/// attributes, scripts and plain text are not links.
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("valid regex"));

/// Resolve a raw href against the page URL. Fragment stripped; only
/// http(s) targets survive (`mailto:`, `tel:`, `javascript:` are dropped).
fn resolve_href(raw: &str, base: Option<&Url>) -> Option<Url> {
    let raw = raw.trim();
    let mut parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(raw).ok()?,
        Err(_) => return None,
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.set_fragment(None);
    Some(parsed)
}

/// All http(s) links in `html`, resolved against `page_url`, deduplicated in
/// first-seen order.
pub fn extract_links(html: &str, page_url: &str) -> Vec<Url> {
    let base = Url::parse(page_url).ok();
    let mut seen = HashSet::new();

    HREF_RE
        .captures_iter(html)
        .filter_map(|cap| resolve_href(&cap[1], base.as_ref()))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}
