//! PDF text extraction: content streams, layout regions, fragments.

mod content;
mod extractor;
mod layout;
mod normalize;
mod options;

pub use content::{SpanDecoder, TextSpan};
pub use extractor::PdfExtractor;
pub use layout::{
    detect_columns, group_lines_into_regions, group_spans_into_lines, page_regions, Column,
    TextLine, TextRegion,
};
pub use normalize::normalize_text;
pub use options::{ErrorMode, ExtractOptions, PageSelection};
