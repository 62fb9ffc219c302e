//! Plain-text projection and size statistics of rendered documents.

use scraper::Html;
use scraper::node::Node;

/// Characters per printed page used for page estimates.
const CHARS_PER_PAGE: usize = 2000;

/// Concatenate the text nodes of an HTML fragment.
///
/// Entities are decoded; no markup survives. Whitespace is left as the
/// fragment had it.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());
    for node in fragment.root_element().descendants() {
        if let Node::Text(content) = node.value() {
            text.push_str(content);
        }
    }
    text
}

/// Size summary of a markdown document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DocumentStats {
    /// Characters in the markdown source.
    pub characters: usize,
    /// Words in the plain-text projection. Each CJK ideograph is one word.
    pub words: usize,
    /// Rough printed page count, at least 1.
    pub estimated_pages: usize,
}

impl DocumentStats {
    /// Compute statistics from the markdown source and its plain text.
    #[must_use]
    pub fn compute(markdown: &str, plain_text: &str) -> Self {
        let characters = markdown.chars().count();
        Self {
            characters,
            words: count_words(plain_text),
            estimated_pages: characters.div_ceil(CHARS_PER_PAGE).max(1),
        }
    }
}

/// Count words, treating every CJK unified ideograph as its own word.
fn count_words(text: &str) -> usize {
    let ideographs = text.chars().filter(|&c| is_cjk_ideograph(c)).count();
    let words = text
        .split(|c: char| c.is_whitespace() || is_cjk_ideograph(c))
        .filter(|word| !word.is_empty())
        .count();
    ideographs + words
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}
