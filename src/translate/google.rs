//! Translation through Google's public web translation endpoint.

use crate::defaults;
use crate::error::{DubError, Result};
use crate::language::TargetLanguage;
use crate::translate::translator::Translator;
use async_trait::async_trait;
use std::time::Duration;

/// Configuration for the Google translator.
#[derive(Debug, Clone)]
pub struct GoogleTranslateConfig {
    pub endpoint: String,
    /// Source language code, or "auto" to let the service detect it.
    pub source_language: String,
    pub timeout: Duration,
}

impl Default for GoogleTranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::GOOGLE_TRANSLATE_ENDPOINT.to_string(),
            source_language: defaults::AUTO_LANGUAGE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Translator backed by `translate.googleapis.com`.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    config: GoogleTranslateConfig,
}

impl GoogleTranslator {
    pub fn new(config: GoogleTranslateConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn request_url(&self, text: &str, target: TargetLanguage) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("client", "gtx"),
                ("sl", self.config.source_language.as_str()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| DubError::ConfigInvalidValue {
            key: "translate.endpoint".to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String> {
        let url = self.request_url(text, target)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DubError::Translation {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(DubError::Translation {
                message: format!("service returned status {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| DubError::Translation {
            message: format!("failed to read response: {e}"),
        })?;

        parse_response(&body)
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Extract the translated text from a `translate_a/single` response.
///
/// The body is a nested JSON array whose first element lists sentence
/// chunks as `[translated, original, ...]`.
pub fn parse_response(body: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| DubError::Translation {
            message: format!("invalid response JSON: {e}"),
        })?;

    let chunks = value
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| DubError::Translation {
            message: "response has no translation chunks".to_string(),
        })?;

    let translated: String = chunks
        .iter()
        .filter_map(|chunk| chunk.get(0).and_then(|t| t.as_str()))
        .collect();

    if translated.trim().is_empty() {
        return Err(DubError::Translation {
            message: "service returned an empty translation".to_string(),
        });
    }
    Ok(translated.trim().to_string())
}
