use crate::defaults;
use crate::error::{DubError, Result};
use crate::language::TargetLanguage;
use crate::media::ffmpeg::FfmpegConfig;
use crate::pipeline::orchestrator::PipelineConfig;
use crate::stt::whisper::WhisperConfig;
use crate::translate::google::GoogleTranslateConfig;
use crate::tts::espeak::EspeakConfig;
use crate::tts::google::GoogleTtsConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub stt: SttConfig,
    pub dub: DubConfig,
    pub translate: TranslateConfig,
    pub tts: TtsConfig,
    pub audio: AudioConfig,
    pub media: MediaConfig,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    /// Source language code, or "auto"
    pub language: String,
    pub threads: Option<usize>,
}

/// Job-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DubConfig {
    /// Target language used when none is given on the command line
    pub target_language: Option<TargetLanguage>,
    /// Fail on videos without detected speech
    pub require_speech: bool,
    pub keep_workdir: bool,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslateConfig {
    pub source_language: String,
    pub concurrency: usize,
    pub endpoint: String,
    /// Per-request timeout, e.g. "30s"
    pub timeout: String,
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TtsConfig {
    pub backend: TtsBackend,
    pub concurrency: usize,
    pub endpoint: String,
    pub espeak_binary: String,
    pub timeout: String,
}

/// Composed track configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
}

/// External media tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MediaConfig {
    pub ffmpeg: String,
    pub audio_codec: String,
}

/// Speech synthesis backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TtsBackend {
    #[default]
    Google,
    Espeak,
}

impl fmt::Display for TtsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtsBackend::Google => f.write_str("google"),
            TtsBackend::Espeak => f.write_str("espeak"),
        }
    }
}

impl FromStr for TtsBackend {
    type Err = DubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gtts" => Ok(TtsBackend::Google),
            "espeak" | "espeak-ng" => Ok(TtsBackend::Espeak),
            other => Err(DubError::ConfigInvalidValue {
                key: "tts.backend".to_string(),
                message: format!("unknown backend '{}', expected google or espeak", other),
            }),
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::AUTO_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

impl Default for DubConfig {
    fn default() -> Self {
        Self {
            target_language: None,
            require_speech: true,
            keep_workdir: false,
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            source_language: defaults::AUTO_LANGUAGE.to_string(),
            concurrency: defaults::TRANSLATE_CONCURRENCY,
            endpoint: defaults::GOOGLE_TRANSLATE_ENDPOINT.to_string(),
            timeout: defaults::REQUEST_TIMEOUT.to_string(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: TtsBackend::Google,
            concurrency: defaults::SYNTHESIS_CONCURRENCY,
            endpoint: defaults::GOOGLE_TTS_ENDPOINT.to_string(),
            espeak_binary: defaults::ESPEAK_BINARY.to_string(),
            timeout: defaults::REQUEST_TIMEOUT.to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::OUTPUT_SAMPLE_RATE,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg: defaults::FFMPEG_BINARY.to_string(),
            audio_codec: defaults::AUDIO_CODEC.to_string(),
        }
    }
}

fn parse_timeout(key: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value).map_err(|e| DubError::ConfigInvalidValue {
        key: key.to_string(),
        message: format!("'{}': {}", value, e),
    })
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML or invalid values.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - REDUB_MODEL → stt.model
    /// - REDUB_LANGUAGE → stt.language
    /// - REDUB_TTS_BACKEND → tts.backend
    /// - REDUB_FFMPEG → media.ffmpeg
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(model) = std::env::var("REDUB_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("REDUB_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(backend) = std::env::var("REDUB_TTS_BACKEND")
            && !backend.is_empty()
        {
            self.tts.backend = backend.parse()?;
        }

        if let Ok(ffmpeg) = std::env::var("REDUB_FFMPEG")
            && !ffmpeg.is_empty()
        {
            self.media.ffmpeg = ffmpeg;
        }

        Ok(self)
    }

    /// Check values serde cannot: positive counts and parseable durations.
    pub fn validate(&self) -> Result<()> {
        if self.translate.concurrency == 0 {
            return Err(DubError::ConfigInvalidValue {
                key: "translate.concurrency".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.tts.concurrency == 0 {
            return Err(DubError::ConfigInvalidValue {
                key: "tts.concurrency".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.audio.sample_rate == 0 {
            return Err(DubError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        parse_timeout("translate.timeout", &self.translate.timeout)?;
        parse_timeout("tts.timeout", &self.tts.timeout)?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/redub/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("redub")
            .join("config.toml")
    }

    /// The default configuration as TOML, for `config dump`.
    pub fn dump_template() -> Result<String> {
        Self::default().to_toml()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DubError::Other(e.to_string()))
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            sample_rate: self.audio.sample_rate,
            require_speech: self.dub.require_speech,
            translate_concurrency: self.translate.concurrency,
            synthesis_concurrency: self.tts.concurrency,
            keep_workdir: self.dub.keep_workdir,
        }
    }

    pub fn whisper_config(&self, model_path: PathBuf) -> WhisperConfig {
        WhisperConfig {
            model_path,
            language: self.stt.language.clone(),
            threads: self.stt.threads,
        }
    }

    pub fn google_translate_config(&self) -> Result<GoogleTranslateConfig> {
        Ok(GoogleTranslateConfig {
            endpoint: self.translate.endpoint.clone(),
            source_language: self.translate.source_language.clone(),
            timeout: parse_timeout("translate.timeout", &self.translate.timeout)?,
        })
    }

    pub fn google_tts_config(&self) -> Result<GoogleTtsConfig> {
        Ok(GoogleTtsConfig {
            endpoint: self.tts.endpoint.clone(),
            sample_rate: self.audio.sample_rate,
            timeout: parse_timeout("tts.timeout", &self.tts.timeout)?,
        })
    }

    pub fn espeak_config(&self) -> EspeakConfig {
        EspeakConfig {
            binary: self.tts.espeak_binary.clone(),
            sample_rate: self.audio.sample_rate,
        }
    }

    pub fn ffmpeg_config(&self) -> FfmpegConfig {
        FfmpegConfig {
            binary: self.media.ffmpeg.clone(),
            audio_codec: self.media.audio_codec.clone(),
        }
    }
}
