//! Safe markdown to HTML rendering.
//!
//! This crate turns untrusted markdown into an HTML fragment that can be
//! inserted into a page without further escaping.
//!
//! # Architecture
//!
//! Rendering runs in three stages:
//! - [`MarkdownRenderer`]: drives pulldown-cmark events and writes raw HTML.
//!   Code blocks are delegated to a [`CodeBlockRenderer`] strategy; the default
//!   [`HighlightClassRenderer`] tags them for a client-side highlighter.
//! - [`Sanitizer`]: removes everything outside a fixed allow-list of the
//!   elements and attributes the renderer produces.
//! - [`Pipeline`]: ties both together, catches rendering faults and derives
//!   plain text and statistics from the sanitized output.
//!
//! # Example
//!
//! ```
//! use mdsafe_renderer::{Pipeline, RenderOptions};
//!
//! let pipeline = Pipeline::new(RenderOptions::default());
//! let document = pipeline.render("# Hello\n\n**Bold** text").unwrap();
//! assert_eq!(document.title.as_deref(), Some("Hello"));
//! assert_eq!(document.html, "<h1>Hello</h1>\n<p><strong>Bold</strong> text</p>\n");
//! ```

mod autolink;
mod code_block;
mod html;
mod lang;
mod pipeline;
mod renderer;
mod sanitize;
mod state;
mod text;
mod util;

pub use code_block::{CodeBlockRenderer, HighlightClassRenderer};
pub use lang::{is_valid_lang, sanitize_lang};
pub use pipeline::{
    ERROR_FRAGMENT, Pipeline, RenderError, RenderedDocument, document_stats, get_plain_text,
    parse_markdown,
};
pub use renderer::{MarkdownRenderer, RenderOptions, RenderResult};
pub use sanitize::{Sanitizer, sanitize};
pub use state::escape_html;
pub use text::{DocumentStats, html_to_text};
