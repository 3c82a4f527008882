//! Translator configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which translation service to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Self-hosted service exposing `/translate` and `/translate_indic`
    #[default]
    Endpoint,
    /// Sarvam AI translate API
    Sarvam,
    /// OpenAI chat completions
    OpenAi,
}

impl Provider {
    /// Lowercase name, as used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Endpoint => "endpoint",
            Provider::Sarvam => "sarvam",
            Provider::OpenAi => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "endpoint" => Ok(Provider::Endpoint),
            "sarvam" => Ok(Provider::Sarvam),
            "openai" | "gpt" => Ok(Provider::OpenAi),
            other => Err(Error::Config(format!("unknown provider: {}", other))),
        }
    }
}

/// Settings for building a translator.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Service to use
    pub provider: Provider,

    /// Service base URL (required for `endpoint`; overrides the default for
    /// the hosted providers)
    pub base_url: Option<String>,

    /// API key (required for `sarvam` and `openai`)
    pub api_key: Option<String>,

    /// Model name (provider default when unset)
    pub model: Option<String>,

    /// Language of the source document
    pub source_language: String,

    /// Request timeout in seconds (none by default)
    pub timeout_secs: Option<u64>,
}

impl TranslatorConfig {
    /// Create a config for the given provider.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the source language.
    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The API key, or a config error naming the provider.
    pub(crate) fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{} provider requires an API key", self.provider)))
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Endpoint,
            base_url: None,
            api_key: None,
            model: None,
            source_language: "English".to_string(),
            timeout_secs: None,
        }
    }
}

impl fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("source_language", &self.source_language)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
