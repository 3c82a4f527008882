//! TOML run configuration.
//!
//! Every section is optional; missing values fall back to the option
//! defaults. A complete file looks like:
//!
//! ```toml
//! [translator]
//! provider = "openai"
//! api_key = "sk-..."
//! timeout_secs = 60
//!
//! [pipeline]
//! target_language = "Hindi"
//! error_policy = "skip"
//! parallel = true
//! workers = 4
//!
//! [extract]
//! pages = "1-20"
//! error_mode = "lenient"
//!
//! [extract.classifier]
//! footnote_band = 0.84
//!
//! [glossary]
//! path = "glossary.xlsx"
//! source = "English"
//! target = "Hindi"
//! transliteration = "Transliteration"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parser::{ErrorMode, ExtractOptions, PageSelection};
use crate::pipeline::PipelineOptions;
use crate::segment::ClassifierConfig;
use crate::translate::{Glossary, GlossaryColumns, TranslatorConfig};

/// Whole-run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translator: TranslatorConfig,
    pub pipeline: PipelineOptions,
    pub extract: ExtractSection,
    pub glossary: GlossarySection,
}

/// `[extract]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    /// Page selection such as `"1-10"` or `"1,3,5-7"`; all pages when unset
    pub pages: Option<String>,
    pub error_mode: ErrorMode,
    pub normalize_text: bool,
    pub classifier: ClassifierConfig,
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            pages: None,
            error_mode: ErrorMode::default(),
            normalize_text: true,
            classifier: ClassifierConfig::default(),
        }
    }
}

/// `[glossary]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlossarySection {
    /// Spreadsheet to load; no glossary when unset
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub columns: GlossaryColumns,
}

impl Config {
    /// Load a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse a configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Extraction options described by the `[extract]` section.
    pub fn extract_options(&self) -> Result<ExtractOptions> {
        let pages = match &self.extract.pages {
            Some(pages) => PageSelection::parse(pages)?,
            None => PageSelection::All,
        };
        Ok(ExtractOptions::new()
            .with_error_mode(self.extract.error_mode)
            .with_pages(pages)
            .with_classifier(self.extract.classifier)
            .with_normalization(self.extract.normalize_text))
    }

    /// Load the configured glossary, if any.
    pub fn load_glossary(&self) -> Result<Option<Glossary>> {
        self.glossary
            .path
            .as_ref()
            .map(|path| Glossary::from_spreadsheet(path, &self.glossary.columns))
            .transpose()
    }

    /// Pipeline options with the configured glossary attached.
    pub fn pipeline_options(&self) -> Result<PipelineOptions> {
        let mut options = self.pipeline.clone();
        if let Some(glossary) = self.load_glossary()? {
            options.glossary = Some(Arc::new(glossary));
        }
        Ok(options)
    }
}
