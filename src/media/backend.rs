use crate::audio::clip::AudioClip;
use crate::error::{DubError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Container demuxing, audio decoding and muxing.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Decode the best audio stream of `video` as mono PCM at `sample_rate`.
    async fn extract_audio(&self, video: &Path, sample_rate: u32) -> Result<AudioClip>;

    /// Decode compressed audio bytes (e.g. MP3) as mono PCM at `sample_rate`.
    async fn decode_audio(&self, data: &[u8], sample_rate: u32) -> Result<AudioClip>;

    /// Write `output`: the video stream of `video` untouched, audio replaced
    /// by the WAV file at `audio`.
    async fn replace_audio(&self, video: &Path, audio: &Path, output: &Path) -> Result<()>;
}

#[async_trait]
impl<T: MediaBackend + ?Sized> MediaBackend for Arc<T> {
    async fn extract_audio(&self, video: &Path, sample_rate: u32) -> Result<AudioClip> {
        (**self).extract_audio(video, sample_rate).await
    }

    async fn decode_audio(&self, data: &[u8], sample_rate: u32) -> Result<AudioClip> {
        (**self).decode_audio(data, sample_rate).await
    }

    async fn replace_audio(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        (**self).replace_audio(video, audio, output).await
    }
}

/// A mux request recorded by [`MockMedia`].
#[derive(Debug, Clone, PartialEq)]
pub struct MuxCall {
    pub video: PathBuf,
    pub output: PathBuf,
    /// The composed track as it was handed to the muxer.
    pub track: AudioClip,
}

/// In-memory media backend for testing.
///
/// `extract_audio` returns a silent track of the configured duration and
/// `replace_audio` copies the video bytes to the output and records the
/// composed track it was given.
#[derive(Debug, Default)]
pub struct MockMedia {
    duration: f64,
    fail_extract: bool,
    fail_mux: bool,
    muxed: Mutex<Vec<MuxCall>>,
}

impl MockMedia {
    /// A backend whose videos have `duration` seconds of audio.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn with_extract_failure(mut self) -> Self {
        self.fail_extract = true;
        self
    }

    pub fn with_mux_failure(mut self) -> Self {
        self.fail_mux = true;
        self
    }

    /// Mux calls made so far.
    pub fn mux_calls(&self) -> Vec<MuxCall> {
        self.muxed
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MediaBackend for MockMedia {
    async fn extract_audio(&self, _video: &Path, sample_rate: u32) -> Result<AudioClip> {
        if self.fail_extract {
            return Err(DubError::AudioExtraction {
                message: "mock extraction failure".to_string(),
            });
        }
        Ok(AudioClip::silence(self.duration, sample_rate))
    }

    async fn decode_audio(&self, data: &[u8], sample_rate: u32) -> Result<AudioClip> {
        Ok(AudioClip::new(
            crate::audio::wav::pcm_from_le_bytes(data),
            sample_rate,
        ))
    }

    async fn replace_audio(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        if self.fail_mux {
            return Err(DubError::Mux {
                message: "mock mux failure".to_string(),
            });
        }
        let track = crate::audio::wav::read_wav(std::io::BufReader::new(std::fs::File::open(
            audio,
        )?))?;
        let bytes = tokio::fs::read(video).await.unwrap_or_default();
        tokio::fs::write(output, bytes).await?;

        if let Ok(mut calls) = self.muxed.lock() {
            calls.push(MuxCall {
                video: video.to_path_buf(),
                output: output.to_path_buf(),
                track,
            });
        }
        Ok(())
    }
}
