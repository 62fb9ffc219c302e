//! Per-document state the renderer keeps while walking the event stream.

use pulldown_cmark::Alignment;

/// Text buffer that is only filled between `start` and `finish`.
///
/// Used for code block bodies and image alt text, both of which are written
/// out as a unit once the closing event arrives.
#[derive(Default)]
pub struct TextCapture {
    active: bool,
    buffer: String,
}

impl TextCapture {
    pub fn start(&mut self) {
        self.active = true;
        self.buffer.clear();
    }

    pub fn finish(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.buffer)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Open code block: its declared language and collected body.
#[derive(Default)]
pub struct CodeBlockState {
    /// Raw first word of the info string; validated by the code block renderer.
    language: Option<String>,
    body: TextCapture,
}

impl CodeBlockState {
    pub fn start(&mut self, language: Option<String>) {
        self.language = language;
        self.body.start();
    }

    /// Close the block, returning `(language, body)`.
    pub fn end(&mut self) -> (Option<String>, String) {
        (self.language.take(), self.body.finish())
    }

    pub fn is_active(&self) -> bool {
        self.body.is_active()
    }

    pub fn push_str(&mut self, text: &str) {
        self.body.push_str(text);
    }

    pub fn push_newline(&mut self) {
        self.body.push_str("\n");
    }
}

/// Column styles of the open table and the cell cursor.
#[derive(Default)]
pub struct TableState {
    in_head: bool,
    /// `style` attribute per column, already rendered; `""` for unaligned.
    column_styles: Vec<&'static str>,
    column: usize,
}

impl TableState {
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        self.column_styles = alignments.into_iter().map(alignment_style).collect();
        self.in_head = false;
        self.column = 0;
    }

    pub fn start_head(&mut self) {
        self.in_head = true;
        self.column = 0;
    }

    pub fn end_head(&mut self) {
        self.in_head = false;
    }

    pub fn start_row(&mut self) {
        self.column = 0;
    }

    pub fn next_cell(&mut self) {
        self.column += 1;
    }

    pub fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Style attribute for the current cell, with a leading space.
    ///
    /// Cells past the delimiter row's column count get no style.
    pub fn current_alignment_style(&self) -> &'static str {
        self.column_styles.get(self.column).copied().unwrap_or("")
    }
}

/// The values here are the only `style` values the sanitizer keeps on cells.
fn alignment_style(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => r#" style="text-align:left""#,
        Alignment::Center => r#" style="text-align:center""#,
        Alignment::Right => r#" style="text-align:right""#,
        Alignment::None => "",
    }
}

/// Captures the plain text of the first H1 as the document title.
#[derive(Default)]
pub struct TitleState {
    /// Whether we're inside the first H1.
    capturing: bool,
    /// Title text collected so far.
    text: String,
    /// Completed title, if the document had an H1.
    title: Option<String>,
}

impl TitleState {
    /// Called when a heading opens. Only the first H1 starts a capture.
    pub fn start_heading(&mut self, level: u8) {
        if level == 1 && self.title.is_none() {
            self.capturing = true;
            self.text.clear();
        }
    }

    /// Called when a heading closes.
    pub fn end_heading(&mut self) {
        if self.capturing {
            self.capturing = false;
            self.title = Some(self.text.trim().to_owned());
        }
    }

    /// Check if title text is being captured.
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Append text to the title buffer.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Take the extracted title. Empty headings yield `None`.
    pub fn take_title(&mut self) -> Option<String> {
        self.title.take().filter(|title| !title.is_empty())
    }
}

/// Escape the five HTML-significant characters.
///
/// Safe in both text and double- or single-quoted attribute context.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
