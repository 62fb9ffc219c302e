//! Markdown to sanitized HTML pipeline.
//!
//! Rendering is pure: the same input always yields the same output, and the
//! only shared state is the read-only sanitizer allow-list. Any panic raised
//! while rendering is caught and reported as [`RenderError`]; the
//! always-succeeding entry points replace it with [`ERROR_FRAGMENT`].

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use crate::code_block::{CodeBlockRenderer, HighlightClassRenderer};
use crate::renderer::{MarkdownRenderer, RenderOptions};
use crate::sanitize::Sanitizer;
use crate::text::{DocumentStats, html_to_text};

/// Fragment returned in place of a document that failed to render.
pub const ERROR_FRAGMENT: &str = r#"<p style="color: red;">Markdown parse error</p>"#;

static DEFAULT_PIPELINE: LazyLock<Pipeline> = LazyLock::new(Pipeline::default);

/// Error raised while rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The parser, renderer or code block strategy panicked.
    #[error("markdown rendering panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },
}

/// Sanitized output of one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Sanitized HTML fragment.
    pub html: String,
    /// Plain text of the first H1 heading.
    pub title: Option<String>,
}

/// Configured markdown pipeline: parse, render, sanitize.
///
/// Cheap to clone; safe to share between threads.
#[derive(Clone)]
pub struct Pipeline {
    options: RenderOptions,
    code_renderer: Arc<dyn CodeBlockRenderer>,
    sanitizer: &'static Sanitizer,
}

impl Pipeline {
    /// Create a pipeline with the default code block renderer.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            code_renderer: Arc::new(HighlightClassRenderer),
            sanitizer: Sanitizer::shared(),
        }
    }

    /// Replace the code block rendering strategy.
    #[must_use]
    pub fn with_code_renderer<C: CodeBlockRenderer + 'static>(mut self, renderer: C) -> Self {
        self.code_renderer = Arc::new(renderer);
        self
    }

    /// Options this pipeline renders with.
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render markdown to sanitized HTML.
    ///
    /// Blank input yields an empty document without running the parser.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Panicked`] if rendering panicked.
    pub fn render(&self, markdown: &str) -> Result<RenderedDocument, RenderError> {
        if markdown.trim().is_empty() {
            return Ok(RenderedDocument::default());
        }

        let start = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| {
            MarkdownRenderer::new(&self.options, self.code_renderer.as_ref())
                .render_markdown(markdown)
        }))
        .map_err(|payload| RenderError::Panicked {
            message: panic_message(payload.as_ref()),
        })?;

        let html = self.sanitizer.clean(&result.html);
        tracing::debug!(
            input_bytes = markdown.len(),
            output_bytes = html.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Rendered markdown"
        );

        Ok(RenderedDocument {
            html,
            title: result.title,
        })
    }

    /// Render markdown, substituting [`ERROR_FRAGMENT`] on failure.
    ///
    /// Never fails; the failure is logged.
    #[must_use]
    pub fn render_document(&self, markdown: &str) -> RenderedDocument {
        self.render(markdown).unwrap_or_else(|err| {
            tracing::error!(error = %err, "Markdown rendering failed");
            RenderedDocument {
                html: self.sanitizer.clean(ERROR_FRAGMENT),
                title: None,
            }
        })
    }

    /// Render markdown to sanitized HTML. Never fails.
    #[must_use]
    pub fn render_html(&self, markdown: &str) -> String {
        self.render_document(markdown).html
    }

    /// Render markdown and strip all markup. Never fails.
    #[must_use]
    pub fn plain_text(&self, markdown: &str) -> String {
        let html = self.render_html(markdown);
        if html.is_empty() {
            return String::new();
        }
        html_to_text(&html)
    }

    /// Size statistics for a markdown document.
    #[must_use]
    pub fn stats(&self, markdown: &str) -> DocumentStats {
        DocumentStats::compute(markdown, &self.plain_text(markdown))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Convert markdown to sanitized HTML with the default configuration.
///
/// GFM and line breaks are enabled. Never fails: blank input gives `""` and a
/// rendering fault gives [`ERROR_FRAGMENT`].
///
/// # Examples
///
/// ```
/// use mdsafe_renderer::parse_markdown;
///
/// let html = parse_markdown("**bold** <img src=x onerror=alert(1)>");
/// assert_eq!(html, "<p><strong>bold</strong> <img src=\"x\"></p>\n");
/// ```
#[must_use]
pub fn parse_markdown(markdown: &str) -> String {
    DEFAULT_PIPELINE.render_html(markdown)
}

/// Plain text of a markdown document with the default configuration.
///
/// # Examples
///
/// ```
/// use mdsafe_renderer::get_plain_text;
///
/// assert_eq!(get_plain_text("# Title\n\nBody **text**"), "Title\nBody text\n");
/// ```
#[must_use]
pub fn get_plain_text(markdown: &str) -> String {
    DEFAULT_PIPELINE.plain_text(markdown)
}

/// Size statistics of a markdown document with the default configuration.
#[must_use]
pub fn document_stats(markdown: &str) -> DocumentStats {
    DEFAULT_PIPELINE.stats(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regex::Regex;

    const PAYLOADS: &[&str] = &[
        "<script>alert(1)</script>",
        "<SCRIPT SRC=//evil.test/x.js></SCRIPT>",
        "<scr<script>ipt>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        "<IMG SRC=x OnErRoR=alert(1)>",
        "<svg onload=alert(1)>",
        "<body onload=alert(1)>",
        "<a href=\"javascript:alert(1)\">x</a>",
        "<a href=\"JAVASCRIPT:alert(1)\">x</a>",
        "<a href=\"&#x6A;avascript:alert(1)\">x</a>",
        "<a href=\"java&#x09;script:alert(1)\">x</a>",
        "[click](javascript:alert(1))",
        "[click](JaVaScRiPt:alert(1))",
        "[click](&#106;avascript:alert(1))",
        "![img](javascript:alert(1))",
        "<iframe src=\"https://evil.test\"></iframe>",
        "<object data=\"x.swf\"></object><embed src=\"x.swf\">",
        "<a href=\"data:text/html;base64,PHNjcmlwdD5hbGVydCgxKTwvc2NyaXB0Pg==\">x</a>",
        "<div style=\"background:url(javascript:alert(1))\">x</div>",
        "<math><mi xlink:href=\"javascript:alert(1)\">x</mi></math>",
        "```\"><script>alert(1)</script>\nx\n```",
        "```js onclick=alert(1)\nx\n```",
        "<pre data-lang=\"x\" onmouseover=\"alert(1)\"><code class=\"hljs\">x</code></pre>",
        "<p>a<!--<script>alert(1)</script>--></p>",
        "<style>@import 'javascript:alert(1)';</style>",
        "<form action=\"javascript:alert(1)\"><button>x</button></form>",
        "<input onfocus=alert(1) autofocus>",
        "<details open ontoggle=alert(1)>",
        "| a |\n|---|\n| <img src=x onerror=alert(1)> |",
        "- [ ] <a href=\"javascript:alert(1)\">task</a>",
        "> <script>alert(1)</script>",
        "https://example.com/\"onmouseover=\"alert(1)",
    ];

    fn assert_safe(html: &str) {
        let lower = html.to_lowercase();
        let handler = Regex::new(r"(?i)\son[a-z]+\s*=").unwrap();
        let script_url = Regex::new(r#"(?i)(href|src)\s*=\s*["']?\s*javascript:"#).unwrap();
        assert!(!lower.contains("<script"), "script tag in {html}");
        assert!(!handler.is_match(html), "event handler in {html}");
        assert!(!script_url.is_match(html), "javascript URL in {html}");
        assert!(!lower.contains("data:text/html"), "data URL in {html}");
        for tag in ["<iframe", "<object", "<embed", "<style", "<form", "<svg", "<math"] {
            assert!(!lower.contains(tag), "{tag} in {html}");
        }
    }

    #[test]
    fn test_adversarial_payloads_are_neutralized() {
        for payload in PAYLOADS {
            assert_safe(&parse_markdown(payload));
            assert_safe(&parse_markdown(&format!("text\n\n{payload}\n\nmore")));
        }
    }

    #[test]
    fn test_sanitization_is_idempotent() {
        let sanitizer = Sanitizer::shared();
        for payload in PAYLOADS {
            let html = parse_markdown(payload);
            assert_eq!(sanitizer.clean(&html), html, "not idempotent for {payload}");
        }
        let html = parse_markdown("# T\n\n| a | b |\n|:-:|---|\n| 1 | 2 |\n\n- [x] done\n\n```rust\nfn f() {}\n```");
        assert_eq!(sanitizer.clean(&html), html);
        let html = parse_markdown("<pre>\n\n\nx</pre>");
        assert_eq!(sanitizer.clean(&html), html);
    }

    #[test]
    fn test_raw_pre_is_idempotent() {
        let html = parse_markdown("<pre>\n\n\nx</pre>");
        assert!(html.starts_with("<pre>\n\n\nx</pre>"), "{html:?}");
        assert_eq!(Sanitizer::shared().clean(&html), html);
        assert_eq!(Sanitizer::shared().clean(&Sanitizer::shared().clean(&html)), html);
    }

    #[test]
    fn test_email_autolink() {
        assert_eq!(
            parse_markdown("<user@example.com>"),
            "<p><a href=\"mailto:user@example.com\" rel=\"noopener noreferrer\">user@example.com</a></p>\n"
        );
    }

    #[test]
    fn test_raw_anchor_keeps_its_text() {
        let html = parse_markdown(r#"x <a href="/a">https://e.com</a>"#);
        assert_eq!(
            html,
            "<p>x <a href=\"/a\" rel=\"noopener noreferrer\">https://e.com</a></p>\n"
        );
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(parse_markdown(""), "");
        assert_eq!(parse_markdown("   "), "");
        assert_eq!(parse_markdown("\n\t \n"), "");
        assert_eq!(get_plain_text(""), "");
        assert_eq!(get_plain_text("  \n"), "");
    }

    #[test]
    fn test_code_block_round_trip() {
        // The renderer writes alert(&#39;x&#39;); re-serialization after
        // sanitizing writes apostrophes in text literally. Both parse to the
        // same inert text node.
        let html = parse_markdown("```js\nalert('x')\n```");
        assert_eq!(
            html,
            "<pre data-lang=\"js\"><code class=\"hljs language-js\">alert('x')\n</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_content_is_text() {
        let html = parse_markdown("```html\n<script>alert(1)</script>\n```");
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert_safe(&html);
    }

    #[test]
    fn test_gfm_table() {
        let html = parse_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(
            html,
            "<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td>1</td>\n<td>2</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_line_break() {
        let html = parse_markdown("first line\nsecond line");
        assert_eq!(html, "<p>first line<br>\nsecond line</p>\n");
    }

    #[test]
    fn test_links_get_rel() {
        let html = parse_markdown("[site](https://example.com)");
        assert_eq!(
            html,
            "<p><a href=\"https://example.com\" rel=\"noopener noreferrer\">site</a></p>\n"
        );
    }

    #[test]
    fn test_new_tab_links() {
        let pipeline = Pipeline::new(RenderOptions {
            external_links_new_tab: true,
            ..RenderOptions::default()
        });
        let html = pipeline.render_html("https://example.com");
        assert_eq!(
            html,
            "<p><a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">https://example.com</a></p>\n"
        );
    }

    #[test]
    fn test_task_list() {
        let html = parse_markdown("- [x] done\n- [ ] todo");
        assert!(html.contains(r#"<input type="checkbox" checked="" disabled="">"#));
        assert!(html.contains(r#"<input type="checkbox" disabled="">"#));
    }

    #[test]
    fn test_plain_text() {
        let text = get_plain_text("# Title\n\nBody **text**");
        assert!(text.contains("Title"));
        assert!(text.contains("Body text"));
        for forbidden in ['#', '*', '<', '>'] {
            assert!(!text.contains(forbidden), "{forbidden} in {text:?}");
        }
    }

    #[test]
    fn test_plain_text_drops_scripts() {
        let text = get_plain_text("hello <script>alert('x')</script> world");
        assert!(!text.contains("alert"));
        assert!(text.contains("hello"));
    }

    #[test]
    fn test_render_title() {
        let document = Pipeline::default()
            .render("Intro\n\n# The *Title*\n\ntext")
            .unwrap();
        assert_eq!(document.title, Some("The Title".to_owned()));
    }

    #[test]
    fn test_stats() {
        let stats = document_stats("# Hello\n\nworld 你好");
        assert_eq!(stats.characters, 17);
        assert_eq!(stats.words, 4);
        assert_eq!(stats.estimated_pages, 1);
    }

    struct PanickingRenderer;

    impl CodeBlockRenderer for PanickingRenderer {
        fn render(&self, _source: &str, _lang: Option<&str>, _out: &mut String) {
            panic!("highlighter exploded");
        }
    }

    #[test]
    fn test_render_fault_is_reported() {
        let pipeline = Pipeline::default().with_code_renderer(PanickingRenderer);
        let err = pipeline.render("```\nx\n```").unwrap_err();
        assert!(matches!(err, RenderError::Panicked { .. }));
        assert!(err.to_string().contains("highlighter exploded"));
    }

    #[test]
    fn test_render_fault_becomes_error_fragment() {
        let pipeline = Pipeline::default().with_code_renderer(PanickingRenderer);
        assert_eq!(pipeline.render_html("```\nx\n```"), ERROR_FRAGMENT);
        assert_eq!(pipeline.plain_text("```\nx\n```"), "Markdown parse error");
        // Documents without code blocks are unaffected
        assert_eq!(pipeline.render_html("ok"), "<p>ok</p>\n");
    }

    #[test]
    fn test_error_fragment_survives_sanitizer() {
        assert_eq!(Sanitizer::shared().clean(ERROR_FRAGMENT), ERROR_FRAGMENT);
    }

    #[test]
    fn test_deterministic() {
        let markdown = "# A\n\nSome `code` and https://example.com\n\n```py\nx = 1\n```";
        assert_eq!(parse_markdown(markdown), parse_markdown(markdown));
    }

    #[test]
    fn test_concurrent_rendering() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || parse_markdown(&format!("# Doc {i}\n\nbody")))
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let html = handle.join().unwrap();
            assert!(html.contains(&format!("<h1>Doc {i}</h1>")));
        }
    }

    #[test]
    fn test_deeply_nested_input_terminates() {
        let quotes = ">".repeat(1000);
        let brackets = "[".repeat(1000);
        let emphasis = "*a".repeat(1000);
        for markdown in [quotes, brackets, emphasis] {
            assert_safe(&parse_markdown(&markdown));
        }
    }
}
