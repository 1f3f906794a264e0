use crate::audio::clip::AudioClip;
use crate::error::{DubError, Result};
use crate::language::TargetLanguage;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for text-to-speech synthesis.
///
/// The returned clip's length is whatever the voice produced; callers never
/// assume it matches the segment it was made for.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` spoken in `language`.
    async fn synthesize(&self, text: &str, language: TargetLanguage) -> Result<AudioClip>;

    /// Name of the backend, for reporting.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Synthesizer + ?Sized> Synthesizer for Arc<T> {
    async fn synthesize(&self, text: &str, language: TargetLanguage) -> Result<AudioClip> {
        (**self).synthesize(text, language).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock synthesizer for testing.
///
/// Produces a constant-amplitude clip. The duration defaults to one second
/// and can be set per text; specific texts can fail, and the whole backend
/// can be made to never return (for cancellation tests).
#[derive(Debug)]
pub struct MockSynthesizer {
    sample_rate: u32,
    amplitude: i16,
    default_duration: f64,
    durations: HashMap<String, f64>,
    failing: HashSet<String>,
    hang: bool,
    calls: AtomicUsize,
}

impl MockSynthesizer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            amplitude: 1000,
            default_duration: 1.0,
            durations: HashMap::new(),
            failing: HashSet::new(),
            hang: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_amplitude(mut self, amplitude: i16) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_default_duration(mut self, seconds: f64) -> Self {
        self.default_duration = seconds;
        self
    }

    /// Produce a clip of `seconds` whenever `text` is synthesized.
    pub fn with_duration(mut self, text: &str, seconds: f64) -> Self {
        self.durations.insert(text.to_string(), seconds);
        self
    }

    /// Fail whenever `text` is synthesized.
    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    /// Never complete a synthesis call.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Number of synthesize calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, _language: TargetLanguage) -> Result<AudioClip> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(text) {
            return Err(DubError::Synthesis {
                message: format!("mock synthesis failure for '{}'", text),
            });
        }
        let seconds = self
            .durations
            .get(text)
            .copied()
            .unwrap_or(self.default_duration);
        let len = (seconds * self.sample_rate as f64).round().max(0.0) as usize;
        Ok(AudioClip::new(vec![self.amplitude; len], self.sample_rate))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn mock_produces_default_duration() {
        let tts = MockSynthesizer::new(1000).with_amplitude(7);
        let clip = tts.synthesize("hi", TargetLanguage::French).await.unwrap();
        assert_eq!(clip.len(), 1000);
        assert_eq!(clip.sample_rate(), 1000);
        assert!(clip.samples().iter().all(|&s| s == 7));
        assert_eq!(tts.calls(), 1);
    }

    #[tokio::test]
    async fn mock_uses_per_text_duration() {
        let tts = MockSynthesizer::new(1000).with_duration("long one", 2.5);
        let clip = tts
            .synthesize("long one", TargetLanguage::Hindi)
            .await
            .unwrap();
        assert_eq!(clip.len(), 2500);
    }

    #[tokio::test]
    async fn mock_fails_on_selected_text() {
        let tts = MockSynthesizer::new(1000).failing_on("bad");
        let result = tts.synthesize("bad", TargetLanguage::Tamil).await;
        assert!(matches!(result, Err(DubError::Synthesis { .. })));
    }

    #[tokio::test]
    async fn hanging_mock_never_completes() {
        let tts = MockSynthesizer::new(1000).hanging();
        let result = tokio::time::timeout(
            Duration::from_millis(20),
            tts.synthesize("x", TargetLanguage::Telugu),
        )
        .await;
        assert!(result.is_err());
    }
}
