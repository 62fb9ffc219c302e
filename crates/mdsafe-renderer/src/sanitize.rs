//! Allow-list HTML sanitizer for rendered markdown.
//!
//! Wraps an [`ammonia::Builder`] configured for exactly the elements the
//! renderer produces. Anything else, including every scripting vector, is
//! removed. Attribute values the renderer controls (`class`, `data-lang`,
//! `style`, `type`, `target`) are additionally checked against their only
//! legitimate shapes.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use ammonia::Builder;
use regex::Regex;

use crate::lang::is_valid_lang;

/// Elements produced by [`MarkdownRenderer`](crate::MarkdownRenderer).
const ALLOWED_TAGS: &[&str] = &[
    "a",
    "blockquote",
    "br",
    "code",
    "del",
    "em",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "img",
    "input",
    "li",
    "ol",
    "p",
    "pre",
    "s",
    "strong",
    "table",
    "tbody",
    "td",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Per-element attributes. `rel` on links is set by the sanitizer itself.
const ALLOWED_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target"]),
    ("img", &["src", "alt", "title"]),
    ("pre", &["data-lang"]),
    ("code", &["class"]),
    ("ol", &["start"]),
    ("th", &["style"]),
    ("td", &["style"]),
    ("input", &["type", "checked", "disabled"]),
    ("p", &["style"]),
];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Cell alignment styles written by the table renderer.
const CELL_STYLES: &[&str] = &["text-align:left", "text-align:center", "text-align:right"];

/// Paragraph style of the render error fragment.
const ERROR_STYLE: &str = "color: red;";

const LINK_REL: &str = "noopener noreferrer";

static SHARED: LazyLock<Sanitizer> = LazyLock::new(Sanitizer::new);

/// A `<pre>` start tag directly followed by a newline in serialized output.
static PRE_LEADING_NEWLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(<pre(?:\s[^>]*)?>)\n").expect("invalid pre newline regex")
});

/// Allow-list sanitizer for rendered markdown HTML.
///
/// Building the allow-list is not free; use [`Sanitizer::shared`] or the
/// [`sanitize`] function to reuse the process-wide instance.
pub struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    /// Build a sanitizer with the markdown allow-list.
    #[must_use]
    pub fn new() -> Self {
        let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = ALLOWED_ATTRIBUTES
            .iter()
            .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
            .collect();

        let mut builder = Builder::default();
        builder
            .tags(ALLOWED_TAGS.iter().copied().collect())
            .tag_attributes(tag_attributes)
            .generic_attributes(HashSet::new())
            .generic_attribute_prefixes(HashSet::new())
            .url_schemes(URL_SCHEMES.iter().copied().collect())
            .link_rel(Some(LINK_REL))
            .strip_comments(true)
            .clean_content_tags(HashSet::from(["script", "style"]))
            .attribute_filter(filter_attribute);

        Self { builder }
    }

    /// Process-wide sanitizer instance.
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Sanitize an HTML fragment.
    ///
    /// Sanitizing already-sanitized output returns it unchanged.
    #[must_use]
    pub fn clean(&self, html: &str) -> String {
        let cleaned = self.builder.clean(html).to_string();
        // The parser drops one newline right after `<pre>` and the serializer
        // does not write it back; restore it so the output parses to the
        // same text it was serialized from.
        PRE_LEADING_NEWLINE
            .replace_all(&cleaned, "${1}\n\n")
            .into_owned()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sanitize an HTML fragment with the shared markdown allow-list.
///
/// # Examples
///
/// ```
/// use mdsafe_renderer::sanitize;
///
/// let html = sanitize(r#"<p onclick="steal()">hi</p><script>alert(1)</script>"#);
/// assert_eq!(html, "<p>hi</p>");
/// ```
#[must_use]
pub fn sanitize(html: &str) -> String {
    Sanitizer::shared().clean(html)
}

/// Check attribute values the renderer controls.
///
/// Returning `None` drops the attribute; other attributes pass unchanged
/// (their names were already allow-listed, URLs are checked by ammonia).
fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    let allowed = match (element, attribute) {
        ("code", "class") => is_code_class(value),
        ("pre", "data-lang") => is_valid_lang(value),
        ("th" | "td", "style") => CELL_STYLES.contains(&value),
        ("p", "style") => value == ERROR_STYLE,
        ("input", "type") => value.eq_ignore_ascii_case("checkbox"),
        ("a", "target") => value == "_blank",
        _ => true,
    };
    allowed.then_some(Cow::Borrowed(value))
}

/// A code class is `hljs` optionally followed by `language-<tag>`.
fn is_code_class(value: &str) -> bool {
    value.split_ascii_whitespace().all(|token| {
        token == "hljs"
            || token
                .strip_prefix("language-")
                .is_some_and(|lang| !lang.is_empty() && is_valid_lang(lang))
    })
}
