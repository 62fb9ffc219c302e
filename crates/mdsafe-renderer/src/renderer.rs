//! Markdown event renderer with a pluggable code block strategy.

use std::fmt::Write;
use std::sync::LazyLock;

use pulldown_cmark::{
    CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;

use crate::autolink::push_autolinked;
use crate::code_block::{CodeBlockRenderer, fence_language};
use crate::html::{write_image, write_link_start, write_task_list_marker};
use crate::state::{CodeBlockState, TableState, TextCapture, TitleState, escape_html};
use crate::util::heading_level_to_num;

/// Opening or closing `<a>` tag in raw HTML; group 1 is `/` for a close.
static RAW_ANCHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(/?)a(?:\s[^>]*)?>").expect("invalid raw anchor regex")
});

/// Markdown dialect and output switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// GitHub Flavored Markdown: tables, strikethrough, task lists and bare URL autolinks.
    pub gfm: bool,
    /// Render single newlines inside paragraphs as `<br>`.
    pub breaks: bool,
    /// Open absolute `http(s)` links in a new tab.
    pub external_links_new_tab: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: true,
            external_links_new_tab: false,
        }
    }
}

/// Result of rendering markdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML, not yet sanitized.
    pub html: String,
    /// Plain text of the first H1 heading.
    pub title: Option<String>,
}

/// Markdown renderer driving pulldown-cmark events.
///
/// Common elements (paragraphs, lists, tables, inline formatting) are written
/// directly. Code blocks always go through the [`CodeBlockRenderer`] supplied
/// at construction.
///
/// The output is raw HTML: raw HTML in the source is copied through untouched
/// and must be passed to [`Sanitizer`](crate::Sanitizer) before use.
pub struct MarkdownRenderer<'r> {
    output: String,
    options: RenderOptions,
    code_renderer: &'r dyn CodeBlockRenderer,
    code: CodeBlockState,
    table: TableState,
    image: TextCapture,
    title: TitleState,
    pending_image: Option<(String, String)>,
    /// Open markdown links.
    link_depth: usize,
    /// Open `<a>` elements written as raw HTML.
    raw_link_depth: usize,
}

impl<'r> MarkdownRenderer<'r> {
    /// Create a renderer with the given options and code block strategy.
    #[must_use]
    pub fn new(options: &RenderOptions, code_renderer: &'r dyn CodeBlockRenderer) -> Self {
        Self {
            output: String::with_capacity(4096),
            options: *options,
            code_renderer,
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: TextCapture::default(),
            title: TitleState::default(),
            pending_image: None,
            link_depth: 0,
            raw_link_depth: 0,
        }
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.options.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Render markdown text directly using configured parser options.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let events = TextMergeStream::new(self.create_parser(markdown));
        self.render(events)
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        RenderResult {
            html: std::mem::take(&mut self.output),
            title: self.title.take_title(),
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => self.output.push_str("<hr>\n"),
            Event::TaskListMarker(checked) => write_task_list_marker(checked, &mut self.output),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        // Alt text is plain text; formatting inside an image is dropped
        if self.image.is_active() && !matches!(tag, Tag::Image { .. }) {
            return;
        }
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                let level = heading_level_to_num(level);
                self.title.start_heading(level);
                write!(self.output, "<h{level}>").unwrap();
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>\n"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(ref info) => fence_language(info).map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>\n"),
                Some(n) => writeln!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>\n"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead>\n<tr>\n");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>\n");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<del>"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                self.link_depth += 1;
                let href = if link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.to_string()
                };
                write_link_start(
                    &href,
                    &title,
                    self.options.external_links_new_tab,
                    &mut self.output,
                );
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Start collecting alt text; image will be rendered in end_tag
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        if self.image.is_active() && tag != TagEnd::Image {
            return;
        }
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(level) => {
                self.title.end_heading();
                writeln!(self.output, "</h{}>", heading_level_to_num(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>\n"),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                self.code_renderer
                    .render(&content, lang.as_deref(), &mut self.output);
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::Image => {
                // Render image with collected alt text
                let alt = self.image.finish();
                if let Some((src, title)) = self.pending_image.take() {
                    write_image(&src, &alt, &title, &mut self.output);
                }
            }
            TagEnd::Table => self.output.push_str("</tbody>\n</table>\n"),
            TagEnd::TableHead => {
                self.output.push_str("</tr>\n</thead>\n<tbody>\n");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>\n"
                } else {
                    "</td>\n"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</del>"),
            TagEnd::Link => {
                self.link_depth = self.link_depth.saturating_sub(1);
                self.output.push_str("</a>");
            }
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
            return;
        }
        if self.title.is_capturing() {
            self.title.push_str(text);
        }
        if self.image.is_active() {
            self.image.push_str(text);
        } else if self.options.gfm && self.link_depth == 0 && self.raw_link_depth == 0 {
            push_autolinked(text, self.options.external_links_new_tab, &mut self.output);
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.title.is_capturing() {
            self.title.push_str(code);
        }
        if self.image.is_active() {
            self.image.push_str(code);
        } else {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }

    fn raw_html(&mut self, html: &str) {
        // Alt text is plain text
        if self.image.is_active() {
            return;
        }
        for anchor in RAW_ANCHOR_PATTERN.captures_iter(html) {
            if anchor[1].is_empty() {
                self.raw_link_depth += 1;
            } else {
                self.raw_link_depth = self.raw_link_depth.saturating_sub(1);
            }
        }
        self.output.push_str(html);
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.options.breaks {
            self.output.push_str("<br>\n");
        } else {
            self.output.push('\n');
        }
        if self.title.is_capturing() {
            self.title.push_str(" ");
        }
    }

    fn hard_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.output.push_str("<br>\n");
        }
        if self.title.is_capturing() {
            self.title.push_str(" ");
        }
    }
}
