//! Speech synthesis through Google's public `translate_tts` endpoint.
//!
//! The endpoint only accepts short texts, so longer input is split on word
//! boundaries, each part fetched as MP3, and the concatenated stream decoded
//! once through the media backend.

use crate::audio::clip::AudioClip;
use crate::defaults;
use crate::error::{DubError, Result};
use crate::language::TargetLanguage;
use crate::media::backend::MediaBackend;
use crate::tts::synthesizer::Synthesizer;
use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GoogleTtsConfig {
    pub endpoint: String,
    /// Sample rate of the decoded clips.
    pub sample_rate: u32,
    pub timeout: Duration,
}

impl Default for GoogleTtsConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::GOOGLE_TTS_ENDPOINT.to_string(),
            sample_rate: defaults::OUTPUT_SAMPLE_RATE,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct GoogleTts {
    client: reqwest::Client,
    config: GoogleTtsConfig,
    media: Arc<dyn MediaBackend>,
}

impl std::fmt::Debug for GoogleTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTts")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GoogleTts {
    pub fn new(config: GoogleTtsConfig, media: Arc<dyn MediaBackend>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            media,
        })
    }

    fn request_url(&self, chunk: &str, language: TargetLanguage) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language.code()),
                ("q", chunk),
            ],
        )
        .map_err(|e| DubError::ConfigInvalidValue {
            key: "tts.endpoint".to_string(),
            message: e.to_string(),
        })
    }

    async fn fetch_chunk(&self, chunk: &str, language: TargetLanguage) -> Result<Vec<u8>> {
        let url = self.request_url(chunk, language)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DubError::Synthesis {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(DubError::Synthesis {
                message: format!("service returned status {}", response.status()),
            });
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(bytes) = stream.next().await {
            let bytes = bytes.map_err(|e| DubError::Synthesis {
                message: format!("failed to read audio: {e}"),
            })?;
            body.extend_from_slice(&bytes);
        }
        Ok(body)
    }
}

#[async_trait]
impl Synthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, language: TargetLanguage) -> Result<AudioClip> {
        let chunks = split_for_tts(text, defaults::GOOGLE_TTS_MAX_CHARS);
        if chunks.is_empty() {
            return Err(DubError::Synthesis {
                message: "nothing to synthesize".to_string(),
            });
        }

        let mut mp3 = Vec::new();
        for chunk in &chunks {
            mp3.extend(self.fetch_chunk(chunk, language).await?);
        }
        if mp3.is_empty() {
            return Err(DubError::Synthesis {
                message: "service returned no audio".to_string(),
            });
        }

        self.media
            .decode_audio(&mp3, self.config.sample_rate)
            .await
            .map_err(|e| DubError::Synthesis {
                message: e.to_string(),
            })
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Breaks on whitespace; a single word longer than `max_chars` is cut at
/// character boundaries.
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
