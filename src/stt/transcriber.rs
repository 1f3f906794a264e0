use crate::error::{DubError, Result};
use std::sync::Arc;

/// One time-stamped piece of recognized speech.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Start time in seconds from the beginning of the audio.
    pub start: f64,
    /// End time in seconds from the beginning of the audio.
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Full transcription of an audio track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    /// Segments in the order the model produced them (non-decreasing start).
    pub segments: Vec<TranscriptSegment>,
    /// Detected source language code, empty if unknown.
    pub language: String,
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
/// Implementations are loaded once per process and shared between jobs.
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples into time-stamped segments.
    ///
    /// # Arguments
    /// * `audio` - Audio samples as 16-bit PCM at 16kHz mono
    fn transcribe(&self, audio: &[i16]) -> Result<Transcript>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across jobs.
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[i16]) -> Result<Transcript> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    segments: Vec<TranscriptSegment>,
    language: String,
    should_fail: bool,
}

impl MockTranscriber {
    /// Create a new mock transcriber that returns no segments
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: Vec::new(),
            language: "en".to_string(),
            should_fail: false,
        }
    }

    /// Configure the mock to return specific segments
    pub fn with_segments(mut self, segments: Vec<TranscriptSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the detected language
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[i16]) -> Result<Transcript> {
        if self.should_fail {
            Err(DubError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(Transcript {
                segments: self.segments.clone(),
                language: self.language.clone(),
            })
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transcriber_returns_segments() {
        let transcriber = MockTranscriber::new("test-model").with_segments(vec![
            TranscriptSegment::new(0.0, 1.5, "Hello there"),
            TranscriptSegment::new(1.5, 3.0, "General Kenobi"),
        ]);

        let transcript = transcriber.transcribe(&[0i16; 1000]).unwrap();

        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[1].text, "General Kenobi");
        assert_eq!(transcript.language, "en");
    }

    #[test]
    fn test_mock_transcriber_returns_error_when_configured() {
        let transcriber = MockTranscriber::new("test-model").with_failure();

        match transcriber.transcribe(&[0i16; 1000]) {
            Err(DubError::Transcription { message }) => {
                assert_eq!(message, "mock transcription failure");
            }
            other => panic!("Expected Transcription error, got {:?}", other),
        }
    }

    #[test]
    fn test_mock_transcriber_is_ready() {
        assert!(MockTranscriber::new("test-model").is_ready());
        assert!(!MockTranscriber::new("test-model").with_failure().is_ready());
    }

    #[test]
    fn test_transcriber_trait_is_object_safe() {
        let transcriber: Arc<dyn Transcriber> = Arc::new(
            MockTranscriber::new("test-model")
                .with_language("fr")
                .with_segments(vec![TranscriptSegment::new(0.0, 1.0, "bonjour")]),
        );

        assert_eq!(transcriber.model_name(), "test-model");
        let transcript = transcriber.transcribe(&[]).unwrap();
        assert_eq!(transcript.language, "fr");
        assert_eq!(transcript.segments[0].text, "bonjour");
    }
}
