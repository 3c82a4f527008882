//! Data model shared by extraction, segmentation and translation.
//!
//! All types are transient: they are produced and consumed within a single
//! document run and never persisted beyond the flat output file.

mod extraction;
mod fragment;

pub use extraction::Extraction;
pub use fragment::{FootnoteEntry, PageFragment, ParagraphBlock};
