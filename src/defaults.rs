//! Default configuration constants for redub.
//!
//! Shared between the configuration types, the CLI and the pipeline so the
//! same values are used everywhere.

/// Sample rate used for transcription input, in Hz.
///
/// Whisper models expect 16kHz mono PCM.
pub const TRANSCRIBE_SAMPLE_RATE: u32 = 16000;

/// Default sample rate of the composed dub track, in Hz.
///
/// Google TTS returns 24kHz speech; composing at the same rate avoids a
/// resampling pass for the common backend.
pub const OUTPUT_SAMPLE_RATE: u32 = 24000;

/// Default Whisper model name.
///
/// "base" is multilingual, so the source language is detected automatically.
pub const DEFAULT_MODEL: &str = "base";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Default number of segments translated concurrently.
pub const TRANSLATE_CONCURRENCY: usize = 4;

/// Default number of segments synthesized concurrently.
pub const SYNTHESIS_CONCURRENCY: usize = 4;

/// Default timeout for a single HTTP request to a translation or TTS service.
pub const REQUEST_TIMEOUT: &str = "30s";

/// Google web translation endpoint.
pub const GOOGLE_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Google text-to-speech endpoint.
pub const GOOGLE_TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Maximum characters per Google TTS request.
///
/// Longer texts are split on word boundaries and the MP3 parts concatenated.
pub const GOOGLE_TTS_MAX_CHARS: usize = 100;

/// Default ffmpeg executable.
pub const FFMPEG_BINARY: &str = "ffmpeg";

/// Default espeak-ng executable.
pub const ESPEAK_BINARY: &str = "espeak-ng";

/// Default audio codec for the dubbed video.
pub const AUDIO_CODEC: &str = "aac";

/// Suffix appended to the input file stem for the default output path.
pub const OUTPUT_SUFFIX: &str = "dubbed";
