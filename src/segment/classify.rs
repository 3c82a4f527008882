//! Block classification: body text, footnote, or discard.
//!
//! A fragment is a footnote only when its lexical shape, its position in the
//! bottom band of the page, and its length all agree. Numbered body
//! paragraphs ("12. The king said...") share the lexical shape, so position
//! and length disambiguate.

use serde::{Deserialize, Serialize};

use super::predicates::{is_page_number, FootnoteMarker};
use crate::model::PageFragment;

/// Fraction of the page height below which footnotes may appear.
pub const DEFAULT_FOOTNOTE_BAND: f32 = 0.84;

/// Footnotes are shorter than this many characters.
pub const DEFAULT_MAX_FOOTNOTE_CHARS: usize = 256;

/// Outcome of classifying one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Regular body text
    Body,
    /// Footnote text, kept apart from the body
    Footnote,
    /// Empty or a bare page number
    Discard,
}

/// Thresholds used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// A footnote must start below `footnote_band * page_height` from the top
    pub footnote_band: f32,

    /// A footnote must be strictly shorter than this (in characters)
    pub max_footnote_chars: usize,
}

impl ClassifierConfig {
    /// Create a config with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bottom band ratio (clamped to 0.0..=1.0).
    pub fn with_footnote_band(mut self, band: f32) -> Self {
        self.footnote_band = band.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum footnote length.
    pub fn with_max_footnote_chars(mut self, chars: usize) -> Self {
        self.max_footnote_chars = chars;
        self
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            footnote_band: DEFAULT_FOOTNOTE_BAND,
            max_footnote_chars: DEFAULT_MAX_FOOTNOTE_CHARS,
        }
    }
}

/// Pure classifier over page fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockClassifier {
    config: ClassifierConfig,
}

impl BlockClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a fragment.
    pub fn classify(&self, fragment: &PageFragment) -> Classification {
        self.classify_text(&fragment.text, fragment.y_position, fragment.page_height)
    }

    /// Classify raw text at a vertical position on a page of the given height.
    pub fn classify_text(&self, text: &str, y_position: f32, page_height: f32) -> Classification {
        let text = text.trim();

        if text.is_empty() || is_page_number(text) {
            return Classification::Discard;
        }

        if self.is_footnote(text, y_position, page_height) {
            Classification::Footnote
        } else {
            Classification::Body
        }
    }

    fn is_footnote(&self, text: &str, y_position: f32, page_height: f32) -> bool {
        let Some(marker) = FootnoteMarker::detect(text) else {
            return false;
        };

        let in_bottom_band = y_position > page_height * self.config.footnote_band;
        if !in_bottom_band {
            return false;
        }

        let short_enough = text.chars().count() < self.config.max_footnote_chars;
        if !short_enough {
            log::debug!(
                "Fragment with {} marker in footnote band is too long, keeping as body",
                marker.name()
            );
        }
        short_enough
    }
}

/// Classify a fragment with the default thresholds.
pub fn classify(fragment: &PageFragment) -> Classification {
    BlockClassifier::default().classify(fragment)
}
