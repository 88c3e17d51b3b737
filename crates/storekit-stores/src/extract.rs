//! Small helpers shared by the HTML scrapers.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};

/// Compile `pattern` once. An invalid pattern yields `None` and never matches.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// First capture group of the first match, trimmed. Blank captures count as no match.
pub(crate) fn capture(re: Option<&Regex>, text: &str) -> Option<String> {
    let caps = re?.captures(text)?;
    let value = caps.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Keep the first non-blank value: `slot` is only written while it is blank.
pub fn fill_first(slot: &mut String, candidate: Option<String>) {
    if !slot.trim().is_empty() {
        return;
    }
    if let Some(value) = candidate {
        let value = value.trim();
        if !value.is_empty() {
            *slot = value.to_owned();
        }
    }
}

/// Text of the first element matching `css` whose text is not blank.
pub(crate) fn select_text(doc: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .find(|text| !text.is_empty())
}

/// Attribute of the first element matching `css` that carries a non-blank value.
pub(crate) fn select_attr(doc: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Make `href` absolute against `base`. Absolute URLs pass through.
pub fn absolutize(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_owned();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if href.starts_with('/') {
        return format!("{}{href}", base.trim_end_matches('/'));
    }

    url::Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_owned())
}

/// Decode the five common HTML entities. `&amp;` goes last so `&amp;lt;` stays `&lt;`.
pub fn decode_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }
    s.replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
