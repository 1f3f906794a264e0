//! Machine translation of segment text.

pub mod google;
pub mod translator;

pub use google::{GoogleTranslateConfig, GoogleTranslator};
pub use translator::{MockTranslator, Translator};
