//! redub - Re-dub videos into another language
//!
//! Transcribes the speech of a video, translates each segment, synthesizes
//! the translation and lays it back on the original timeline.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod error;
pub mod language;
pub mod media;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod stt;
pub mod timeline;
pub mod translate;
pub mod tts;

// Composition root - needs everything
#[cfg(all(feature = "model-download", feature = "cli"))]
pub mod app;

// Core timeline and audio types
pub use audio::{AudioClip, ComposedTrack, SynthesizedClip, TrackComposer};
pub use language::TargetLanguage;
pub use timeline::{Segment, SegmentTimeline};

// Collaborator traits
pub use media::MediaBackend;
pub use stt::Transcriber;
pub use translate::Translator;
pub use tts::Synthesizer;

// Pipeline
pub use pipeline::{DubEvent, DubJob, DubPipeline, DubReport, EventSink, PipelineConfig};

// Error handling
pub use error::{DubError, Result};

// Config
pub use config::{Config, TtsBackend};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_has_short_hash_when_built_from_git() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(hash_part.len(), 7, "unexpected hash in {}", ver);
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
