use crate::error::{DubError, Result};
use crate::language::TargetLanguage;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for machine translation of a single text.
///
/// Implementations may fail per call (network, quota); the pipeline falls
/// back to the source text for that segment only.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`.
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String>;

    /// Name of the backend, for reporting.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String> {
        (**self).translate(text, target).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock translator for testing.
///
/// By default returns `"[<code>] <text>"`. Specific texts can be mapped to
/// fixed translations or made to fail.
#[derive(Debug, Default)]
pub struct MockTranslator {
    responses: HashMap<String, String>,
    failing: HashSet<String>,
    fail_all: bool,
    calls: AtomicUsize,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `translation` whenever `text` is translated.
    pub fn with_response(mut self, text: &str, translation: &str) -> Self {
        self.responses
            .insert(text.to_string(), translation.to_string());
        self
    }

    /// Fail whenever `text` is translated.
    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    /// Fail on every call.
    pub fn with_failure(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Number of translate calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all || self.failing.contains(text) {
            return Err(DubError::Translation {
                message: format!("mock translation failure for '{}'", text),
            });
        }
        Ok(self
            .responses
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{}] {}", target.code(), text)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_translator_prefixes_language_code() {
        let translator = MockTranslator::new();
        let out = translator
            .translate("hello", TargetLanguage::French)
            .await
            .unwrap();
        assert_eq!(out, "[fr] hello");
        assert_eq!(translator.calls(), 1);
    }

    #[tokio::test]
    async fn mock_translator_uses_configured_response() {
        let translator = MockTranslator::new().with_response("hello", "नमस्ते");
        let out = translator
            .translate("hello", TargetLanguage::Hindi)
            .await
            .unwrap();
        assert_eq!(out, "नमस्ते");
    }

    #[tokio::test]
    async fn mock_translator_fails_on_selected_text() {
        let translator = MockTranslator::new().failing_on("broken");
        let result = translator.translate("broken", TargetLanguage::Tamil).await;
        assert!(matches!(result, Err(DubError::Translation { .. })));

        let ok = translator.translate("fine", TargetLanguage::Tamil).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn translator_trait_is_object_safe() {
        let translator: Arc<dyn Translator> = Arc::new(MockTranslator::new().with_failure());
        assert_eq!(translator.name(), "mock");
        assert!(
            translator
                .translate("x", TargetLanguage::Kannada)
                .await
                .is_err()
        );
    }
}
