//! Text-to-speech backends.

pub mod espeak;
pub mod google;
pub mod synthesizer;

pub use espeak::{EspeakConfig, EspeakTts};
pub use google::{GoogleTts, GoogleTtsConfig, split_for_tts};
pub use synthesizer::{MockSynthesizer, Synthesizer};
