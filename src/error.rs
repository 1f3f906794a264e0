//! Error types for redub.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DubError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unsupported target language: {name} (supported: {supported})")]
    UnsupportedLanguage { name: String, supported: String },

    // Media I/O errors
    #[error("Audio extraction failed: {message}")]
    AudioExtraction { message: String },

    #[error("Audio decoding failed: {message}")]
    AudioDecode { message: String },

    #[error("Muxing failed: {message}")]
    Mux { message: String },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    // Per-segment errors
    #[error("Translation of segment failed: {message}")]
    Translation { message: String },

    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Clip for segment {index} starts at {start:.3}s, past the track end at {track_end:.3}s")]
    CompositionBounds {
        index: usize,
        start: f64,
        track_end: f64,
    },

    // Timeline and composition invariants
    #[error("Segment index {index} out of range (timeline has {len} segments)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Segment {index} already has a translation")]
    AlreadyTranslated { index: usize },

    #[error("Invalid segment {index}: {message}")]
    InvalidSegment { index: usize, message: String },

    #[error("Invalid track duration: {duration}")]
    InvalidDuration { duration: f64 },

    #[error("Timeline has no segments to dub")]
    EmptyTimeline,

    #[error("Job cancelled")]
    Cancelled,

    // Network errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl DubError {
    /// Pipeline stage a job-level error belongs to, used for the terminal
    /// error line of the CLI.
    pub fn stage(&self) -> &'static str {
        match self {
            DubError::ConfigFileNotFound { .. }
            | DubError::ConfigInvalidValue { .. }
            | DubError::Config(_)
            | DubError::UnsupportedLanguage { .. } => "configuration",
            DubError::AudioExtraction { .. } => "audio extraction",
            DubError::TranscriptionModelNotFound { .. }
            | DubError::Transcription { .. }
            | DubError::EmptyTimeline
            | DubError::InvalidSegment { .. } => "transcription",
            DubError::Translation { .. } => "translation",
            DubError::Synthesis { .. } | DubError::AudioDecode { .. } => "synthesis",
            DubError::CompositionBounds { .. }
            | DubError::IndexOutOfRange { .. }
            | DubError::AlreadyTranslated { .. }
            | DubError::InvalidDuration { .. } => "composition",
            DubError::Mux { .. } => "muxing",
            DubError::Cancelled
            | DubError::Wav(_)
            | DubError::Http(_)
            | DubError::Io(_)
            | DubError::Other(_) => "job",
        }
    }

    /// Whether this error only affects a single segment.
    ///
    /// Per-segment errors are recorded as warnings and never abort a job.
    pub fn is_per_segment(&self) -> bool {
        matches!(
            self,
            DubError::Translation { .. }
                | DubError::Synthesis { .. }
                | DubError::CompositionBounds { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DubError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = DubError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_unsupported_language_display() {
        let error = DubError::UnsupportedLanguage {
            name: "Klingon".to_string(),
            supported: "Hindi, French".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unsupported target language: Klingon (supported: Hindi, French)"
        );
    }

    #[test]
    fn test_composition_bounds_display() {
        let error = DubError::CompositionBounds {
            index: 3,
            start: 12.5,
            track_end: 10.0,
        };
        assert_eq!(
            error.to_string(),
            "Clip for segment 3 starts at 12.500s, past the track end at 10.000s"
        );
    }

    #[test]
    fn test_index_out_of_range_display() {
        let error = DubError::IndexOutOfRange { index: 7, len: 2 };
        assert_eq!(
            error.to_string(),
            "Segment index 7 out of range (timeline has 2 segments)"
        );
    }

    #[test]
    fn test_already_translated_display() {
        let error = DubError::AlreadyTranslated { index: 1 };
        assert_eq!(error.to_string(), "Segment 1 already has a translation");
    }

    #[test]
    fn test_mux_display() {
        let error = DubError::Mux {
            message: "ffmpeg exited with status 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Muxing failed: ffmpeg exited with status 1"
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(
            DubError::Transcription {
                message: "x".to_string()
            }
            .stage(),
            "transcription"
        );
        assert_eq!(
            DubError::Mux {
                message: "x".to_string()
            }
            .stage(),
            "muxing"
        );
        assert_eq!(DubError::EmptyTimeline.stage(), "transcription");
        assert_eq!(
            DubError::AudioExtraction {
                message: "x".to_string()
            }
            .stage(),
            "audio extraction"
        );
    }

    #[test]
    fn test_per_segment_classification() {
        assert!(
            DubError::Translation {
                message: "503".to_string()
            }
            .is_per_segment()
        );
        assert!(
            DubError::Synthesis {
                message: "empty".to_string()
            }
            .is_per_segment()
        );
        assert!(
            DubError::CompositionBounds {
                index: 0,
                start: 1.0,
                track_end: 0.5
            }
            .is_per_segment()
        );
        assert!(
            !DubError::Transcription {
                message: "no model".to_string()
            }
            .is_per_segment()
        );
        assert!(
            !DubError::Mux {
                message: "codec".to_string()
            }
            .is_per_segment()
        );
    }

    #[test]
    fn test_cancelled_is_a_job_error() {
        let error = DubError::Cancelled;
        assert_eq!(error.to_string(), "Job cancelled");
        assert_eq!(error.stage(), "job");
        assert!(!error.is_per_segment());
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: DubError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: DubError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: DubError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<DubError>();
        assert_sync::<DubError>();
    }
}
