//! Bare URL autolinking for GFM text.
//!
//! pulldown-cmark only links `<https://…>` autolinks. GitHub also links bare
//! `http://`, `https://` and `www.` URLs found in running text; this module
//! covers that case on already-merged text runs.

use std::sync::LazyLock;

use regex::Regex;

use crate::html::write_link_start;
use crate::state::escape_html;

static BARE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]+").expect("invalid bare URL regex")
});

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', '\'', '"', ']', '*', '_', '~'];

/// Write `text` escaped, wrapping bare URLs in links.
pub(crate) fn push_autolinked(text: &str, new_tab: bool, out: &mut String) {
    let mut last = 0;
    for found in BARE_URL_PATTERN.find_iter(text) {
        let url = trim_url(found.as_str());
        // A lone "www." or scheme is not a link.
        if url.ends_with("://") || url.eq_ignore_ascii_case("www.") {
            continue;
        }
        let start = found.start();
        let end = start + url.len();

        out.push_str(&escape_html(&text[last..start]));
        let href = if url.len() >= 4 && url[..4].eq_ignore_ascii_case("www.") {
            format!("http://{url}")
        } else {
            url.to_owned()
        };
        write_link_start(&href, "", new_tab, out);
        out.push_str(&escape_html(url));
        out.push_str("</a>");
        last = end;
    }
    out.push_str(&escape_html(&text[last..]));
}

/// Drop trailing punctuation and unbalanced closing parentheses.
fn trim_url(mut url: &str) -> &str {
    loop {
        if let Some(stripped) = url.strip_suffix(TRAILING_PUNCTUATION) {
            url = stripped;
            continue;
        }
        if url.ends_with(')') && url.matches(')').count() > url.matches('(').count() {
            url = &url[..url.len() - 1];
            continue;
        }
        return url;
    }
}
