//! Text segmentation: footnote classification and paragraph reconstruction.
//!
//! Both stages are pure functions over their input. Neither can fail.

mod classify;
pub mod predicates;
mod reconstruct;

pub use classify::{
    classify, BlockClassifier, Classification, ClassifierConfig, DEFAULT_FOOTNOTE_BAND,
    DEFAULT_MAX_FOOTNOTE_CHARS,
};
pub use predicates::FootnoteMarker;
pub use reconstruct::{continues, reconstruct, Accumulator, Paragraphs};

use crate::model::{Extraction, FootnoteEntry, PageFragment};

/// Partition fragments into body text and footnotes.
///
/// Body fragments are trimmed. Discarded fragments are counted but not kept.
pub fn partition<'a, I>(classifier: &BlockClassifier, fragments: I) -> Extraction
where
    I: IntoIterator<Item = &'a PageFragment>,
{
    let mut extraction = Extraction::new();

    for fragment in fragments {
        match classifier.classify(fragment) {
            Classification::Discard => extraction.discarded += 1,
            Classification::Footnote => extraction
                .footnotes
                .push(FootnoteEntry::new(fragment.page_number(), fragment.trimmed())),
            Classification::Body => extraction.body.push(fragment.trimmed().to_string()),
        }
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition() {
        let height = 800.0;
        let fragments = vec![
            PageFragment::new("Chapter text begins", 0, 80.0, height),
            PageFragment::new("and continues here.", 0, 120.0, height),
            PageFragment::new("[1] A footnote.", 0, 700.0, height),
            PageFragment::new("1", 0, 760.0, height),
            PageFragment::new("   ", 1, 100.0, height),
            PageFragment::new("* Second page note", 1, 690.0, height),
        ];

        let extraction = partition(&BlockClassifier::default(), &fragments);

        assert_eq!(
            extraction.body,
            vec!["Chapter text begins", "and continues here."]
        );
        assert_eq!(
            extraction.footnotes,
            vec![
                FootnoteEntry::new(1, "[1] A footnote."),
                FootnoteEntry::new(2, "* Second page note"),
            ]
        );
        assert_eq!(extraction.discarded, 2);
    }
}
