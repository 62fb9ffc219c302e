//! Code fence language tag validation.
//!
//! A language tag ends up inside a `class` value, a `data-lang` value and a CSS
//! selector built by the external highlighter, so only a narrow alphabet is kept.

use std::sync::LazyLock;

use regex::Regex;

/// Letters, digits, `+`, `#`, `.`, `_`, `-`; at most 30 characters.
static LANG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+#._-]{0,30}$").expect("invalid language regex"));

/// Normalize a declared code block language.
///
/// Returns the trimmed input when it is an allowed tag, otherwise the empty
/// string. The empty string means "no language". Never fails.
///
/// # Examples
///
/// ```
/// use mdsafe_renderer::sanitize_lang;
///
/// assert_eq!(sanitize_lang(Some("python")), "python");
/// assert_eq!(sanitize_lang(Some(" c++ ")), "c++");
/// assert_eq!(sanitize_lang(Some("\"><script>")), "");
/// assert_eq!(sanitize_lang(None), "");
/// ```
#[must_use]
pub fn sanitize_lang(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let trimmed = raw.trim();
    if is_valid_lang(trimmed) {
        trimmed.to_owned()
    } else {
        String::new()
    }
}

/// Check whether `tag` is an allowed language tag as-is (no trimming).
#[must_use]
pub fn is_valid_lang(tag: &str) -> bool {
    LANG_PATTERN.is_match(tag)
}
