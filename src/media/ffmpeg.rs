//! Media backend that shells out to the `ffmpeg` binary.
//!
//! Audio is exchanged with ffmpeg as raw `s16le` mono PCM over pipes, so no
//! intermediate files are needed except the WAV track handed to the muxer.

use crate::audio::clip::AudioClip;
use crate::audio::wav::pcm_from_le_bytes;
use crate::defaults;
use crate::error::{DubError, Result};
use crate::media::backend::MediaBackend;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Lines of ffmpeg stderr kept in error messages.
const STDERR_TAIL_LINES: usize = 5;

/// Configuration for the ffmpeg backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegConfig {
    /// ffmpeg executable name or path
    pub binary: String,
    /// Audio codec for the dubbed video
    pub audio_codec: String,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary: defaults::FFMPEG_BINARY.to_string(),
            audio_codec: defaults::AUDIO_CODEC.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FfmpegMedia {
    config: FfmpegConfig,
}

impl FfmpegMedia {
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    /// Check that the configured ffmpeg binary runs.
    pub async fn check_available(&self) -> Result<String> {
        let output = Command::new(&self.config.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            return Err(DubError::Other(format!(
                "{} -version exited with {}",
                self.config.binary, output.status
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }

    /// Arguments that decode an input to mono s16le PCM on stdout.
    fn pcm_output_args(sample_rate: u32) -> Vec<OsString> {
        let rate = sample_rate.to_string();
        ["-vn", "-ac", "1", "-ar", rate.as_str(), "-f", "s16le", "-acodec", "pcm_s16le", "pipe:1"]
            .iter()
            .map(OsString::from)
            .collect()
    }

    fn extract_args(video: &Path, sample_rate: u32) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-nostdin", "-hide_banner", "-loglevel", "error", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(video.as_os_str().to_owned());
        args.extend(Self::pcm_output_args(sample_rate));
        args
    }

    fn decode_args(sample_rate: u32) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-i", "pipe:0"]
            .iter()
            .map(OsString::from)
            .collect();
        args.extend(Self::pcm_output_args(sample_rate));
        args
    }

    fn mux_args(&self, video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-nostdin".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-i".into(),
            video.as_os_str().to_owned(),
            "-i".into(),
            audio.as_os_str().to_owned(),
        ];
        args.extend(
            [
                "-map",
                "0:v",
                "-map",
                "1:a:0",
                "-c:v",
                "copy",
                "-c:a",
                self.config.audio_codec.as_str(),
            ]
            .iter()
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }

    fn command(&self, args: Vec<OsString>) -> Command {
        let mut command = Command::new(&self.config.binary);
        command
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("; ")
}

#[async_trait]
impl MediaBackend for FfmpegMedia {
    async fn extract_audio(&self, video: &Path, sample_rate: u32) -> Result<AudioClip> {
        let output = self
            .command(Self::extract_args(video, sample_rate))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DubError::AudioExtraction {
                message: format!("failed to run {}: {}", self.config.binary, e),
            })?;

        if !output.status.success() {
            return Err(DubError::AudioExtraction {
                message: format!(
                    "{} exited with {}: {}",
                    self.config.binary,
                    output.status,
                    stderr_tail(&output.stderr)
                ),
            });
        }

        Ok(AudioClip::new(pcm_from_le_bytes(&output.stdout), sample_rate))
    }

    async fn decode_audio(&self, data: &[u8], sample_rate: u32) -> Result<AudioClip> {
        let mut child = self
            .command(Self::decode_args(sample_rate))
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| DubError::AudioDecode {
                message: format!("failed to run {}: {}", self.config.binary, e),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| DubError::AudioDecode {
            message: "ffmpeg stdin unavailable".to_string(),
        })?;
        let input = data.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DubError::AudioDecode {
                message: format!("ffmpeg did not finish: {}", e),
            })?;

        // A broken pipe here just means ffmpeg stopped reading; its exit
        // status below carries the real error.
        if let Ok(Err(e)) = writer.await
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(DubError::AudioDecode {
                message: format!("failed to feed ffmpeg: {}", e),
            });
        }

        if !output.status.success() {
            return Err(DubError::AudioDecode {
                message: format!(
                    "{} exited with {}: {}",
                    self.config.binary,
                    output.status,
                    stderr_tail(&output.stderr)
                ),
            });
        }

        Ok(AudioClip::new(pcm_from_le_bytes(&output.stdout), sample_rate))
    }

    async fn replace_audio(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        let result = self
            .command(self.mux_args(video, audio, output))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DubError::Mux {
                message: format!("failed to run {}: {}", self.config.binary, e),
            })?;

        if !result.status.success() {
            return Err(DubError::Mux {
                message: format!(
                    "{} exited with {}: {}",
                    self.config.binary,
                    result.status,
                    stderr_tail(&result.stderr)
                ),
            });
        }
        Ok(())
    }
}
