//! Fragment-level types produced by extraction and consumed by segmentation.

use serde::{Deserialize, Serialize};

/// A unit of extracted text with its vertical position on the page.
///
/// `y_position` is measured from the top edge of the page down to the top of
/// the text region, in the same units as `page_height` (PDF points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFragment {
    /// Raw text of the region, possibly with surrounding whitespace
    pub text: String,

    /// Page index (0-indexed)
    pub page_index: u32,

    /// Distance from the top of the page to the top of the region
    pub y_position: f32,

    /// Height of the page the region came from
    pub page_height: f32,
}

impl PageFragment {
    /// Create a new fragment.
    pub fn new(text: impl Into<String>, page_index: u32, y_position: f32, page_height: f32) -> Self {
        Self {
            text: text.into(),
            page_index,
            y_position,
            page_height,
        }
    }

    /// 1-indexed page number.
    pub fn page_number(&self) -> u32 {
        self.page_index + 1
    }

    /// Text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

/// A footnote separated from the body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteEntry {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Trimmed footnote text
    pub text: String,
}

impl FootnoteEntry {
    /// Create a new footnote entry.
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    /// The label line placed before a footnote in the output.
    pub fn label(&self) -> String {
        format!("Page num: {}", self.page_number)
    }
}

/// One logical paragraph, the unit handed to translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphBlock {
    /// Paragraph text (trimmed, fragments joined by single spaces)
    pub text: String,
}

impl ParagraphBlock {
    /// Create a paragraph block from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Number of characters in the paragraph.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

impl AsRef<str> for ParagraphBlock {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for ParagraphBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_page_number() {
        let fragment = PageFragment::new("  text  ", 4, 100.0, 792.0);
        assert_eq!(fragment.page_number(), 5);
        assert_eq!(fragment.trimmed(), "text");
    }

    #[test]
    fn test_footnote_label() {
        let note = FootnoteEntry::new(12, "[1] A note.");
        assert_eq!(note.label(), "Page num: 12");
    }

    #[test]
    fn test_paragraph_char_count() {
        let block = ParagraphBlock::new("नमस्ते");
        assert_eq!(block.char_count(), 6);
        assert_eq!(block.to_string(), "नमस्ते");
    }
}
