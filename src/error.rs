//! Error types for the pdftrans library.

use std::io;
use thiserror::Error;

/// Result type alias for pdftrans operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, translating or scoring.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Transport-level failure talking to a translation service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A translation service answered with a non-success response.
    #[error("Translation failed ({provider}): {message}")]
    Translation { provider: String, message: String },

    /// Malformed or incomplete glossary table.
    #[error("Glossary error: {0}")]
    Glossary(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Quality evaluation could not be performed.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::Translation`] for the given provider.
    pub fn translation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Translation {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Glossary(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
