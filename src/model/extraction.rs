//! Classified extraction output.

use serde::{Deserialize, Serialize};

use super::FootnoteEntry;

/// Body fragments and footnotes pulled from a document, in extraction order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// Trimmed body-text fragments, in reading order
    pub body: Vec<String>,

    /// Footnotes, in reading order
    pub footnotes: Vec<FootnoteEntry>,

    /// Number of pages the document has
    pub page_count: u32,

    /// Number of fragments that were discarded (empty or page numbers)
    pub discarded: usize,
}

impl Extraction {
    /// Create an empty extraction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing translatable was found.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.footnotes.is_empty()
    }
}
