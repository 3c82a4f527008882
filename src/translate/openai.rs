//! OpenAI chat-completions translation.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, Translator, TranslatorConfig};
use crate::error::{Error, Result};

const NAME: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when none is configured.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 512;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Translator backed by a chat-completions model.
#[derive(Clone)]
pub struct OpenAiTranslator {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    source_language: String,
}

impl OpenAiTranslator {
    /// Create a translator with the default model and English source.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(None)?,
            url: format!("{}/chat/completions", DEFAULT_BASE_URL),
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            source_language: "English".to_string(),
        })
    }

    /// Create a translator from configuration. `api_key` is required.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            client: http_client(config.timeout())?,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            source_language: config.source_language.clone(),
        })
    }

    /// The model in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Prompt sent for one unit of text.
    pub fn prompt(&self, text: &str, target_language: &str) -> String {
        format!(
            "Act as a linguistic expert translating documents from {source} into Indic languages. \
             Translate the following text from {source} to formal {target} with high accuracy, a formal tone, \
             the most appropriate word selection, and respect for the grammar rules and word order of {target}. \
             Prefer words with Sanskrit roots. Check your translation by translating it back to {source} \
             and comparing it with the original. \
             Do not provide any extra text, only the best translation.\n\
             {source} text: {text}\n\
             Translated text:",
            source = self.source_language,
            target = target_language,
            text = text,
        )
    }
}

impl Translator for OpenAiTranslator {
    fn name(&self) -> &str {
        NAME
    }

    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: self.prompt(text, target_language),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;
        let response: ChatResponse = check_status(NAME, response)?.json()?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::translation(NAME, "response contained no choices"))
    }
}
