//! Self-hosted translation endpoint.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, Translator, TranslatorConfig};
use crate::error::{Error, Result};

const NAME: &str = "endpoint";

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    tgt_language: &'a str,
}

#[derive(Serialize)]
struct BackTranslateRequest<'a> {
    text: &'a str,
    source_language: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translated_text: String,
}

/// Client for a service exposing `POST /translate` (into an Indic language)
/// and `POST /translate_indic` (back into English).
#[derive(Debug, Clone)]
pub struct EndpointTranslator {
    client: Client,
    base_url: String,
}

impl EndpointTranslator {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(None)?,
            base_url: base_url.into(),
        })
    }

    /// Create a client from configuration. `base_url` is required.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| Error::Config("endpoint provider requires a base URL".to_string()))?;
        Ok(Self {
            client: http_client(config.timeout())?,
            base_url,
        })
    }

    /// The service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Translate `text` written in `source_language` back into English.
    pub fn back_translate(&self, text: &str, source_language: &str) -> Result<String> {
        let request = BackTranslateRequest {
            text,
            source_language,
        };
        self.post("translate_indic", &request)
    }

    fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self.client.post(&url).json(body).send()?;
        let response: TranslateResponse = check_status(NAME, response)?.json()?;

        if response.translated_text.is_empty() {
            log::debug!("{} returned an empty translation", url);
        }
        Ok(response.translated_text)
    }
}

impl Translator for EndpointTranslator {
    fn name(&self) -> &str {
        NAME
    }

    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let request = TranslateRequest {
            text,
            tgt_language: target_language,
        };
        self.post("translate", &request)
    }
}
