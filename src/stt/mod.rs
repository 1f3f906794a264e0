//! Speech-to-text: turns the extracted audio track into timed segments.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, Transcriber, Transcript, TranscriptSegment};
pub use whisper::{WhisperConfig, WhisperTranscriber};
