//! Supported target languages.
//!
//! The set is closed: anything not listed here is rejected when the CLI
//! arguments or the configuration file are parsed, before a job starts.

use crate::error::DubError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target language for translation and speech synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetLanguage {
    Hindi,
    Kannada,
    Telugu,
    Tamil,
    French,
}

impl TargetLanguage {
    /// All supported languages, in display order.
    pub const ALL: [TargetLanguage; 5] = [
        TargetLanguage::Hindi,
        TargetLanguage::Kannada,
        TargetLanguage::Telugu,
        TargetLanguage::Tamil,
        TargetLanguage::French,
    ];

    /// Two-letter ISO 639-1 code used by the translation and TTS services.
    pub fn code(self) -> &'static str {
        match self {
            TargetLanguage::Hindi => "hi",
            TargetLanguage::Kannada => "kn",
            TargetLanguage::Telugu => "te",
            TargetLanguage::Tamil => "ta",
            TargetLanguage::French => "fr",
        }
    }

    /// Human-readable language name.
    pub fn name(self) -> &'static str {
        match self {
            TargetLanguage::Hindi => "Hindi",
            TargetLanguage::Kannada => "Kannada",
            TargetLanguage::Telugu => "Telugu",
            TargetLanguage::Tamil => "Tamil",
            TargetLanguage::French => "French",
        }
    }

    fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|l| format!("{} ({})", l.name(), l.code()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetLanguage {
    type Err = DubError;

    /// Accepts the language name (case-insensitive) or its two-letter code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(wanted) || l.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DubError::UnsupportedLanguage {
                name: wanted.to_string(),
                supported: Self::supported_list(),
            })
    }
}

impl TryFrom<String> for TargetLanguage {
    type Error = DubError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetLanguage> for String {
    fn from(value: TargetLanguage) -> Self {
        value.name().to_string()
    }
}
