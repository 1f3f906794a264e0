//! External media I/O: audio extraction, decoding and muxing.

pub mod backend;
pub mod ffmpeg;

pub use backend::{MediaBackend, MockMedia, MuxCall};
pub use ffmpeg::{FfmpegConfig, FfmpegMedia};
