//! Translation pipeline: extraction -> paragraphs -> glossary -> translation.
//!
//! The pipeline owns a [`Translator`] and turns an [`Extraction`] into an
//! ordered list of output units: every paragraph in source order, then every
//! footnote preceded by its `Page num: {n}` label line.
//!
//! # Example
//!
//! ```no_run
//! use pdftrans::pipeline::{Pipeline, PipelineOptions};
//! use pdftrans::translate::EndpointTranslator;
//! use pdftrans::ExtractOptions;
//!
//! fn main() -> pdftrans::Result<()> {
//!     let translator = EndpointTranslator::new("http://localhost:5000")?;
//!     let pipeline = Pipeline::new(translator, PipelineOptions::new("Hindi").parallel(4));
//!     let report = pipeline.translate_document("book.pdf", ExtractOptions::default(), "book.txt")?;
//!     println!("{} unit(s), {} failure(s)", report.units.len(), report.failures.len());
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Extraction, FootnoteEntry};
use crate::output::write_units;
use crate::parser::{ExtractOptions, PdfExtractor};
use crate::segment::reconstruct;
use crate::translate::{Glossary, Translator};

/// What to do when a single unit fails to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Emit `[translation failed: <msg>]` in place of the unit
    #[default]
    Marker,
    /// Drop the unit from the output
    Skip,
    /// Stop the run with the error
    Abort,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "marker" => Ok(ErrorPolicy::Marker),
            "skip" => Ok(ErrorPolicy::Skip),
            "abort" => Ok(ErrorPolicy::Abort),
            other => Err(Error::Config(format!(
                "unknown error policy '{}' (expected marker, skip or abort)",
                other
            ))),
        }
    }
}

/// Kind of output unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Paragraph,
    Footnote,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Paragraph => f.write_str("paragraph"),
            UnitKind::Footnote => f.write_str("footnote"),
        }
    }
}

/// A unit the translator could not handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFailure {
    /// Paragraph or footnote
    pub kind: UnitKind,
    /// Position among units of the same kind (0-indexed)
    pub index: usize,
    /// Error message
    pub message: String,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationReport {
    /// Output units in order: paragraphs, then labelled footnotes
    pub units: Vec<String>,
    /// Number of reconstructed paragraphs
    pub paragraphs: usize,
    /// Number of footnotes
    pub footnotes: usize,
    /// Units that failed, in output order
    pub failures: Vec<UnitFailure>,
}

impl TranslationReport {
    /// Number of units translated without error.
    pub fn translated(&self) -> usize {
        (self.paragraphs + self.footnotes).saturating_sub(self.failures.len())
    }

    /// Whether every unit was translated.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Language to translate into
    pub target_language: String,

    /// Per-unit failure handling
    pub error_policy: ErrorPolicy,

    /// Translate units concurrently
    pub parallel: bool,

    /// Worker threads when parallel (0 = one per CPU)
    pub workers: usize,

    /// Glossary applied to paragraphs before translation
    #[serde(skip)]
    pub glossary: Option<Arc<Glossary>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            target_language: "Hindi".to_string(),
            error_policy: ErrorPolicy::default(),
            parallel: false,
            workers: 0,
            glossary: None,
        }
    }
}

impl PipelineOptions {
    /// Options translating into `target_language`, sequentially.
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            ..Default::default()
        }
    }

    /// Set the failure policy.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Translate on a pool of `workers` threads (0 = rayon default).
    pub fn parallel(mut self, workers: usize) -> Self {
        self.parallel = true;
        self.workers = workers;
        self
    }

    /// Translate one unit at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Substitute glossary terms in paragraphs before translating.
    pub fn with_glossary(mut self, glossary: impl Into<Arc<Glossary>>) -> Self {
        self.glossary = Some(glossary.into());
        self
    }
}

type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// One source unit awaiting translation.
struct PendingUnit<'a> {
    kind: UnitKind,
    index: usize,
    text: String,
    footnote: Option<&'a FootnoteEntry>,
}

/// Drives a translator over an extraction.
pub struct Pipeline<T> {
    translator: T,
    options: PipelineOptions,
    progress: Option<Box<ProgressFn>>,
}

impl<T: Translator> Pipeline<T> {
    /// Create a pipeline.
    pub fn new(translator: T, options: PipelineOptions) -> Self {
        Self {
            translator,
            options,
            progress: None,
        }
    }

    /// Report `(done, total)` after each unit is translated. The callback may
    /// run on worker threads and out of order when parallel.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// The options in use.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// The translator in use.
    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// Extract `pdf`, translate it and write the units to `output`.
    pub fn translate_document<P, Q>(
        &self,
        pdf: P,
        extract_options: ExtractOptions,
        output: Q,
    ) -> Result<TranslationReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let pdf = pdf.as_ref();
        let output = output.as_ref();
        log::info!("Translating {} into {}", pdf.display(), self.options.target_language);

        let extraction = PdfExtractor::open_with_options(pdf, extract_options)?.extract()?;
        if extraction.is_empty() {
            log::warn!("No translatable text found in {}", pdf.display());
        }
        let report = self.translate_extraction(&extraction)?;

        write_units(&report.units, output)?;
        log::info!(
            "Wrote {} unit(s) to {} ({} failure(s))",
            report.units.len(),
            output.display(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Translate an extraction into ordered output units.
    pub fn translate_extraction(&self, extraction: &Extraction) -> Result<TranslationReport> {
        let paragraphs = reconstruct(&extraction.body);
        log::info!(
            "Reconstructed {} paragraph(s) from {} fragment(s)",
            paragraphs.len(),
            extraction.body.len()
        );

        let mut pending: Vec<PendingUnit<'_>> =
            Vec::with_capacity(paragraphs.len() + extraction.footnotes.len());
        for (index, paragraph) in paragraphs.into_iter().enumerate() {
            let text = match &self.options.glossary {
                Some(glossary) => glossary.apply(&paragraph.text),
                None => paragraph.text,
            };
            pending.push(PendingUnit {
                kind: UnitKind::Paragraph,
                index,
                text,
                footnote: None,
            });
        }
        let paragraph_count = pending.len();
        for (index, note) in extraction.footnotes.iter().enumerate() {
            pending.push(PendingUnit {
                kind: UnitKind::Footnote,
                index,
                text: note.text.clone(),
                footnote: Some(note),
            });
        }

        let results = self.translate_all(&pending)?;

        let mut report = TranslationReport {
            units: Vec::with_capacity(pending.len()),
            paragraphs: paragraph_count,
            footnotes: extraction.footnotes.len(),
            failures: Vec::new(),
        };

        for (unit, result) in pending.iter().zip(results) {
            // Units left untranslated after an abort
            let Some(result) = result else {
                continue;
            };
            let text = match result {
                Ok(text) => text,
                Err(e) => {
                    log::warn!(
                        "{} {} failed to translate via {}: {}",
                        unit.kind,
                        unit.index + 1,
                        self.translator.name(),
                        e
                    );
                    report.failures.push(UnitFailure {
                        kind: unit.kind,
                        index: unit.index,
                        message: e.to_string(),
                    });
                    match self.options.error_policy {
                        ErrorPolicy::Abort => return Err(e),
                        ErrorPolicy::Skip => continue,
                        ErrorPolicy::Marker => failure_marker(&e),
                    }
                }
            };

            report.units.push(match unit.footnote {
                Some(note) => format!("{}\n{}", note.label(), text),
                None => text,
            });
        }

        log::info!(
            "Translated {} of {} unit(s) into {}",
            report.translated(),
            pending.len(),
            self.options.target_language
        );
        Ok(report)
    }

    /// Translate every unit, returning results in input order.
    ///
    /// Under [`ErrorPolicy::Abort`] units are no longer sent once one has
    /// failed; those come back as `None`.
    fn translate_all(&self, units: &[PendingUnit<'_>]) -> Result<Vec<Option<Result<String>>>> {
        let total = units.len();
        let done = AtomicUsize::new(0);
        let aborted = AtomicBool::new(false);
        let abort_on_error = self.options.error_policy == ErrorPolicy::Abort;
        let target = self.options.target_language.as_str();

        let translate_one = |unit: &PendingUnit<'_>| {
            if abort_on_error && aborted.load(Ordering::SeqCst) {
                return None;
            }
            let result = self.translator.translate(&unit.text, target);
            if abort_on_error && result.is_err() {
                aborted.store(true, Ordering::SeqCst);
            }
            let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(progress) = &self.progress {
                progress(finished, total);
            }
            Some(result)
        };

        if !self.options.parallel || total < 2 {
            return Ok(units.iter().map(translate_one).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .build()
            .map_err(|e| Error::Other(format!("failed to start worker pool: {}", e)))?;
        log::debug!(
            "Translating {} unit(s) on {} worker(s)",
            total,
            pool.current_num_threads()
        );

        Ok(pool.install(|| units.par_iter().map(translate_one).collect()))
    }
}

/// Text emitted in place of a unit under [`ErrorPolicy::Marker`].
pub fn failure_marker(error: &Error) -> String {
    format!("[translation failed: {}]", error)
}
