//! # pdftrans
//!
//! Paragraph-level PDF translation.
//!
//! The library pulls positioned text regions out of a PDF, separates
//! footnotes from body text, rebuilds paragraphs that were split across
//! lines, columns and pages, and sends each paragraph to a translation
//! service. Output is a flat text file with one block per paragraph,
//! followed by the footnotes labelled with their page number.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdftrans::translate::{create_translator, Provider, TranslatorConfig};
//! use pdftrans::{translate_file, PipelineOptions};
//!
//! fn main() -> pdftrans::Result<()> {
//!     let config = TranslatorConfig::new(Provider::Endpoint)
//!         .with_base_url("http://localhost:5000");
//!     let translator = create_translator(&config)?;
//!
//!     let report = translate_file(
//!         translator,
//!         "book.pdf",
//!         "book.hi.txt",
//!         PipelineOptions::new("Hindi"),
//!     )?;
//!     println!("{} paragraph(s), {} footnote(s)", report.paragraphs, report.footnotes);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Footnote separation**: marker, position and length rules
//! - **Paragraph reconstruction**: sentence-boundary and case heuristics
//! - **Two-column layouts**: column detection before line grouping
//! - **Pluggable translators**: self-hosted endpoint, Sarvam AI, OpenAI
//! - **Glossary**: spreadsheet-driven term substitution
//! - **Quality scoring**: BLEU, chrF, ROUGE and TER, with back-translation
//! - **Parallel translation**: Rayon pool with order-preserving collection

pub mod config;
pub mod detect;
pub mod error;
pub mod eval;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod segment;
pub mod translate;

// Re-export commonly used types
pub use config::Config;
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use eval::{evaluate_paragraphs, LexicalScorer, QualityScorer, QualityScores};
pub use model::{Extraction, FootnoteEntry, PageFragment, ParagraphBlock};
pub use output::{render_units, split_units, write_units};
pub use parser::{ErrorMode, ExtractOptions, PageSelection, PdfExtractor};
pub use pipeline::{ErrorPolicy, Pipeline, PipelineOptions, TranslationReport};
pub use segment::{classify, reconstruct, BlockClassifier, Classification, ClassifierConfig};
pub use translate::{Glossary, Translator};

use std::path::Path;

/// Extract and classify a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use pdftrans::extract_file;
///
/// let extraction = extract_file("document.pdf").unwrap();
/// println!("{} body fragment(s)", extraction.body.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    PdfExtractor::open(path)?.extract()
}

/// Extract and classify a PDF file with custom options.
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<Extraction> {
    PdfExtractor::open_with_options(path, options)?.extract()
}

/// Reconstructed paragraphs of a PDF file, without translating them.
///
/// # Example
///
/// ```no_run
/// use pdftrans::paragraphs;
///
/// for paragraph in paragraphs("document.pdf").unwrap() {
///     println!("{}\n", paragraph);
/// }
/// ```
pub fn paragraphs<P: AsRef<Path>>(path: P) -> Result<Vec<ParagraphBlock>> {
    let extraction = extract_file(path)?;
    Ok(reconstruct(&extraction.body))
}

/// Translate a PDF file and write the result to `output`.
pub fn translate_file<T, P, Q>(
    translator: T,
    input: P,
    output: Q,
    options: PipelineOptions,
) -> Result<TranslationReport>
where
    T: Translator,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    Pipeline::new(translator, options).translate_document(input, ExtractOptions::default(), output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_missing_file() {
        assert!(extract_file("/nonexistent/document.pdf").is_err());
    }

    #[test]
    fn test_detect_format_rejects_html() {
        let data = b"<!DOCTYPE html><html></html>";
        assert!(matches!(
            detect_format_from_bytes(data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_extractor_rejects_short_data() {
        assert!(PdfExtractor::from_bytes(b"%PDF").is_err());
        assert!(PdfExtractor::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_translate_file_missing_input() {
        struct Echo;
        impl Translator for Echo {
            fn name(&self) -> &str {
                "echo"
            }
            fn translate(&self, text: &str, _target_language: &str) -> Result<String> {
                Ok(text.to_string())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.txt");
        let result = translate_file(
            Echo,
            dir.path().join("missing.pdf"),
            &output,
            PipelineOptions::default(),
        );
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
