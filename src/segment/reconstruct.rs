//! Paragraph reconstruction from body fragments.
//!
//! Layout extraction splits paragraphs at page and column boundaries. A
//! fragment continues the previous one when the previous text does not end a
//! sentence and the fragment starts with a lowercase letter. Only the pending
//! paragraph and the next fragment are inspected.

use super::predicates::{is_sentence_complete, starts_lowercase};
use crate::model::ParagraphBlock;

/// Accumulator state of the reconstruction fold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Accumulator {
    /// No pending paragraph
    #[default]
    Empty,
    /// A paragraph is being built
    Accumulating(String),
}

impl Accumulator {
    /// Feed one fragment. Returns the next state and, when the pending
    /// paragraph is closed by this fragment, the finished block.
    pub fn step(self, fragment: &str) -> (Accumulator, Option<ParagraphBlock>) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return (self, None);
        }

        match self {
            Accumulator::Empty => (Accumulator::Accumulating(fragment.to_string()), None),
            Accumulator::Accumulating(pending) => {
                if continues(&pending, fragment) {
                    let mut merged = pending;
                    merged.push(' ');
                    merged.push_str(fragment);
                    (Accumulator::Accumulating(merged), None)
                } else {
                    (
                        Accumulator::Accumulating(fragment.to_string()),
                        Some(ParagraphBlock::new(pending)),
                    )
                }
            }
        }
    }

    /// Close the fold, returning the pending paragraph if there is one.
    pub fn finish(self) -> Option<ParagraphBlock> {
        match self {
            Accumulator::Empty => None,
            Accumulator::Accumulating(pending) => Some(ParagraphBlock::new(pending)),
        }
    }

    /// Whether a paragraph is pending.
    pub fn is_empty(&self) -> bool {
        matches!(self, Accumulator::Empty)
    }
}

/// Whether `fragment` continues the paragraph in `pending`.
pub fn continues(pending: &str, fragment: &str) -> bool {
    !is_sentence_complete(pending) && starts_lowercase(fragment)
}

/// Merge body fragments into paragraph blocks.
pub fn reconstruct<I, S>(fragments: I) -> Vec<ParagraphBlock>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Paragraphs::new(fragments.into_iter()).collect()
}

/// Iterator adapter yielding paragraph blocks lazily.
pub struct Paragraphs<I> {
    fragments: I,
    state: Accumulator,
    done: bool,
}

impl<I> Paragraphs<I> {
    /// Wrap an iterator of fragments.
    pub fn new(fragments: I) -> Self {
        Self {
            fragments,
            state: Accumulator::Empty,
            done: false,
        }
    }
}

impl<I, S> Iterator for Paragraphs<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = ParagraphBlock;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for fragment in self.fragments.by_ref() {
            let (next, emitted) = std::mem::take(&mut self.state).step(fragment.as_ref());
            self.state = next;
            if emitted.is_some() {
                return emitted;
            }
        }

        self.done = true;
        std::mem::take(&mut self.state).finish()
    }
}
