//! Output translation into Ghanaian languages

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

const GHANA_NLP_URL: &str = "https://translation-api.ghananlp.org/v1/translate";

/// Language every message is written in before translation
pub const BASE_LANGUAGE: &str = "en";

/// A language the assistant can answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const SUPPORTED_LANGUAGES: [Language; 3] = [
    Language {
        code: "en",
        name: "English",
    },
    Language {
        code: "gaa",
        name: "Ga",
    },
    Language {
        code: "tw",
        name: "Twi",
    },
];

/// Look up a supported language by code
pub fn language(code: &str) -> Option<Language> {
    SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .find(|l| l.code.eq_ignore_ascii_case(code.trim()))
}

/// Translates base-language text. Never fails: the input is returned on any problem.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, language_code: &str, text: &str) -> String;
}

/// GhanaNLP translation API client
pub struct GhanaNlpTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GhanaNlpTranslator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(GHANA_NLP_URL, api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    async fn request(&self, language_code: &str, text: &str) -> Result<String, String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Cache-Control", "no-cache")
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&json!({
                "in": text,
                "lang": format!("{}-{}", BASE_LANGUAGE, language_code),
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(format!("Translation API error: {}", status.as_u16()));
        }

        let value: Value = response.json().await.map_err(|e| e.to_string())?;
        Ok(match value {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}

#[async_trait]
impl Translator for GhanaNlpTranslator {
    async fn translate(&self, language_code: &str, text: &str) -> String {
        if language_code == BASE_LANGUAGE || text.trim().is_empty() {
            return text.to_string();
        }
        match self.request(language_code, text).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!("Translation to {} failed: {}", language_code, e);
                text.to_string()
            }
        }
    }
}

/// Translator that returns its input, used when no API key is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

#[async_trait]
impl Translator for Passthrough {
    async fn translate(&self, _language_code: &str, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_language_lookup() {
        assert_eq!(language("TW").map(|l| l.name), Some("Twi"));
        assert_eq!(language("gaa").map(|l| l.name), Some("Ga"));
        assert!(language("fr").is_none());
    }

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Ocp-Apim-Subscription-Key", "key-123"))
            .and(header("Cache-Control", "no-cache"))
            .and(body_json(json!({ "in": "Hello", "lang": "en-tw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("Agoo")))
            .expect(1)
            .mount(&server)
            .await;

        let translator = GhanaNlpTranslator::with_endpoint(server.uri(), "key-123");
        assert_eq!(translator.translate("tw", "Hello").await, "Agoo");
    }

    #[tokio::test]
    async fn test_server_error_returns_original() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let translator = GhanaNlpTranslator::with_endpoint(server.uri(), "key");
        assert_eq!(translator.translate("tw", "Hello").await, "Hello");
    }

    #[tokio::test]
    async fn test_non_string_body_is_rendered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "out": "Ojekoo" })))
            .mount(&server)
            .await;

        let translator = GhanaNlpTranslator::with_endpoint(server.uri(), "key");
        assert_eq!(
            translator.translate("gaa", "Welcome").await,
            r#"{"out":"Ojekoo"}"#
        );
    }

    #[tokio::test]
    async fn test_base_language_and_blank_text_skip_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let translator = GhanaNlpTranslator::with_endpoint(server.uri(), "key");
        assert_eq!(translator.translate("en", "Hello").await, "Hello");
        assert_eq!(translator.translate("tw", "   ").await, "   ");
        assert_eq!(translator.translate("tw", "").await, "");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_returns_original() {
        let translator =
            GhanaNlpTranslator::with_endpoint("http://127.0.0.1:9/v1/translate", "key");
        assert_eq!(translator.translate("tw", "Good morning").await, "Good morning");
    }
}
