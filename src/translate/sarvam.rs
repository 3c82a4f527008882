//! Sarvam AI translation.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, Translator, TranslatorConfig};
use crate::error::Result;

const NAME: &str = "sarvam";
const DEFAULT_BASE_URL: &str = "https://api.sarvam.ai";
const DEFAULT_MODEL: &str = "mayura:v1";

const LANGUAGE_CODES: [(&str, &str); 11] = [
    ("english", "en-IN"),
    ("hindi", "hi-IN"),
    ("bengali", "bn-IN"),
    ("gujarati", "gu-IN"),
    ("kannada", "kn-IN"),
    ("malayalam", "ml-IN"),
    ("marathi", "mr-IN"),
    ("odia", "od-IN"),
    ("punjabi", "pa-IN"),
    ("tamil", "ta-IN"),
    ("telugu", "te-IN"),
];

/// Map a language name to its Sarvam code (`Hindi` -> `hi-IN`). Values that
/// are not known names are passed through unchanged.
pub fn sarvam_language_code(language: &str) -> String {
    let key = language.trim().to_lowercase();
    LANGUAGE_CODES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| language.trim().to_string())
}

#[derive(Serialize)]
struct SarvamRequest<'a> {
    input: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
    speaker_gender: &'a str,
    mode: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct SarvamResponse {
    translated_text: String,
}

/// Client for `POST https://api.sarvam.ai/translate`.
#[derive(Clone)]
pub struct SarvamTranslator {
    client: Client,
    url: String,
    api_key: String,
    source_language_code: String,
    model: String,
}

impl SarvamTranslator {
    /// Create a client with the default endpoint, English source and the
    /// default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(None)?,
            url: format!("{}/translate", DEFAULT_BASE_URL),
            api_key: api_key.into(),
            source_language_code: sarvam_language_code("English"),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Create a client from configuration. `api_key` is required.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            client: http_client(config.timeout())?,
            url: format!("{}/translate", base_url.trim_end_matches('/')),
            api_key,
            source_language_code: sarvam_language_code(&config.source_language),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

impl Translator for SarvamTranslator {
    fn name(&self) -> &str {
        NAME
    }

    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let target = sarvam_language_code(target_language);
        let request = SarvamRequest {
            input: text,
            source_language_code: &self.source_language_code,
            target_language_code: &target,
            speaker_gender: "Male",
            mode: "formal",
            model: &self.model,
        };

        let response = self
            .client
            .post(&self.url)
            .header("api-subscription-key", self.api_key.as_str())
            .json(&request)
            .send()?;
        let response: SarvamResponse = check_status(NAME, response)?.json()?;
        Ok(response.translated_text)
    }
}
