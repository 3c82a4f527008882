//! Translation providers.
//!
//! Every provider implements [`Translator`]. The pipeline only sees the
//! trait, so tests and callers can plug in their own implementation.
//!
//! # Example
//!
//! ```no_run
//! use pdftrans::translate::{create_translator, Provider, TranslatorConfig};
//!
//! fn main() -> pdftrans::Result<()> {
//!     let config = TranslatorConfig::new(Provider::Endpoint)
//!         .with_base_url("http://localhost:5000");
//!     let translator = create_translator(&config)?;
//!     println!("{}", translator.translate("Good morning.", "Hindi")?);
//!     Ok(())
//! }
//! ```

mod config;
mod endpoint;
pub mod glossary;
mod openai;
mod sarvam;

pub use config::{Provider, TranslatorConfig};
pub use endpoint::EndpointTranslator;
pub use glossary::{Glossary, GlossaryColumns, GlossaryEntry};
pub use openai::{OpenAiTranslator, DEFAULT_OPENAI_MODEL};
pub use sarvam::{sarvam_language_code, SarvamTranslator};

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::error::{Error, Result};

/// A translation service.
pub trait Translator: Send + Sync {
    /// Short provider name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Translate `text` into `target_language`.
    fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

impl<T: Translator + ?Sized> Translator for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        (**self).translate(text, target_language)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        (**self).translate(text, target_language)
    }
}

impl<T: Translator + ?Sized> Translator for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        (**self).translate(text, target_language)
    }
}

/// Build the provider described by `config`.
pub fn create_translator(config: &TranslatorConfig) -> Result<Box<dyn Translator>> {
    let translator: Box<dyn Translator> = match config.provider {
        Provider::Endpoint => Box::new(EndpointTranslator::from_config(config)?),
        Provider::Sarvam => Box::new(SarvamTranslator::from_config(config)?),
        Provider::OpenAi => Box::new(OpenAiTranslator::from_config(config)?),
    };
    log::debug!("Using {} translator", translator.name());
    Ok(translator)
}

fn http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Turn a non-success status into a provider error carrying the body.
fn check_status(provider: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(Error::translation(
        provider,
        format!("HTTP {}: {}", status, body.trim()),
    ))
}

#[cfg(test)]
pub(crate) mod test_server {
    //! One-shot HTTP responder for provider tests.

    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve a single request with the given status and JSON body. The join
    /// handle yields the raw request (headers and body).
    pub fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || respond(&listener, status, body));
        (format!("http://{}", addr), handle)
    }

    /// Serve one request per response, in order.
    pub fn serve_many(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            responses
                .into_iter()
                .map(|(status, body)| respond(&listener, status, body))
                .collect()
        });
        (format!("http://{}", addr), handle)
    }

    fn respond(listener: &TcpListener, status: u16, body: &str) -> String {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut request = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            request.push_str(&line);
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let mut payload = vec![0u8; content_length];
        reader.read_exact(&mut payload).unwrap();
        request.push_str(&String::from_utf8_lossy(&payload));

        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        request
    }

    /// JSON body of a captured request.
    pub fn body_json(request: &str) -> serde_json::Value {
        let body = request.split("\r\n\r\n").nth(1).unwrap_or_default();
        serde_json::from_str(body).unwrap()
    }
}
