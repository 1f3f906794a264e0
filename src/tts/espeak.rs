//! Offline speech synthesis with the `espeak-ng` binary.

use crate::audio::clip::AudioClip;
use crate::audio::wav::read_streamed_wav;
use crate::defaults;
use crate::error::{DubError, Result};
use crate::language::TargetLanguage;
use crate::tts::synthesizer::Synthesizer;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct EspeakConfig {
    pub binary: String,
    /// Sample rate of the returned clips; espeak output is resampled to it.
    pub sample_rate: u32,
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            binary: defaults::ESPEAK_BINARY.to_string(),
            sample_rate: defaults::OUTPUT_SAMPLE_RATE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EspeakTts {
    config: EspeakConfig,
}

impl EspeakTts {
    pub fn new(config: EspeakConfig) -> Self {
        Self { config }
    }

    fn args(text: &str, language: TargetLanguage) -> Vec<String> {
        vec![
            "-v".to_string(),
            language.code().to_string(),
            "--stdout".to_string(),
            text.to_string(),
        ]
    }
}

#[async_trait]
impl Synthesizer for EspeakTts {
    async fn synthesize(&self, text: &str, language: TargetLanguage) -> Result<AudioClip> {
        let output = Command::new(&self.config.binary)
            .args(Self::args(text, language))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DubError::Synthesis {
                message: format!("failed to run {}: {}", self.config.binary, e),
            })?;

        if !output.status.success() {
            return Err(DubError::Synthesis {
                message: format!(
                    "{} exited with {}: {}",
                    self.config.binary,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let clip = read_streamed_wav(output.stdout).map_err(|e| DubError::Synthesis {
            message: format!("unreadable espeak output: {}", e),
        })?;
        Ok(clip.resampled(self.config.sample_rate))
    }

    fn name(&self) -> &str {
        "espeak"
    }
}
