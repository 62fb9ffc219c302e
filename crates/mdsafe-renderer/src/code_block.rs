//! Code block rendering strategy.
//!
//! Every fenced and indented code block is handed to a [`CodeBlockRenderer`].
//! The renderer has no other way of emitting a code block, so swapping the
//! strategy never touches grammar handling.
//!
//! # Example
//!
//! ```
//! use mdsafe_renderer::{CodeBlockRenderer, MarkdownRenderer, RenderOptions, escape_html};
//!
//! struct PlainRenderer;
//!
//! impl CodeBlockRenderer for PlainRenderer {
//!     fn render(&self, source: &str, _lang: Option<&str>, out: &mut String) {
//!         out.push_str("<pre><code>");
//!         out.push_str(&escape_html(source));
//!         out.push_str("</code></pre>\n");
//!     }
//! }
//!
//! let options = RenderOptions::default();
//! let result = MarkdownRenderer::new(&options, &PlainRenderer).render_markdown("```\nx\n```");
//! assert_eq!(result.html, "<pre><code>x\n</code></pre>\n");
//! ```

use std::fmt::Write;

use crate::lang::sanitize_lang;
use crate::state::escape_html;

/// Strategy for turning one code block into HTML.
///
/// Implementations must escape `source` themselves and must not trust `lang`:
/// it is the raw first word of the fence info string.
pub trait CodeBlockRenderer: Send + Sync {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `source` - Literal code block content
    /// * `lang` - Declared language, `None` for indented blocks and bare fences
    /// * `out` - Output buffer to write to
    fn render(&self, source: &str, lang: Option<&str>, out: &mut String);
}

/// Default code block renderer.
///
/// Emits `<pre data-lang="…"><code class="hljs language-…">…</code></pre>`
/// with an allow-listed language tag and escaped content. Coloring is left to
/// an external highlighter keyed on the classes.
#[derive(Clone, Copy, Debug, Default)]
pub struct HighlightClassRenderer;

impl CodeBlockRenderer for HighlightClassRenderer {
    fn render(&self, source: &str, lang: Option<&str>, out: &mut String) {
        let lang = sanitize_lang(lang);
        let class = if lang.is_empty() {
            "hljs".to_owned()
        } else {
            format!("hljs language-{lang}")
        };
        write!(
            out,
            r#"<pre data-lang="{}"><code class="{class}">{}</code></pre>"#,
            escape_html(&lang),
            escape_html(source)
        )
        .unwrap();
        out.push('\n');
    }
}

/// Extract the declared language from a fence info string.
///
/// The language is the first whitespace-delimited word; anything after it
/// (attributes, titles) is ignored. Returns `None` for blank info strings.
pub(crate) fn fence_language(info: &str) -> Option<&str> {
    info.split_whitespace().next()
}
