//! End-to-end dub job: extract, transcribe, translate, synthesize, compose, mux.
//!
//! Stages run strictly in sequence. Translation and synthesis fan out over
//! segments with bounded concurrency; results are collected back in segment
//! order, so the outcome never depends on which request finished first.
//!
//! Failures in extraction, transcription or muxing abort the job. Failures
//! of a single segment's translation or synthesis are recorded as warnings
//! in the [`DubReport`] and the job continues.

use crate::audio::clip::{AudioClip, SynthesizedClip};
use crate::audio::composer::{ComposerConfig, TrackComposer};
use crate::audio::wav::write_wav;
use crate::defaults;
use crate::error::{DubError, Result};
use crate::language::TargetLanguage;
use crate::media::backend::MediaBackend;
use crate::pipeline::events::{DubEvent, EventSink, Stage};
use crate::pipeline::report::{DubReport, DubWarning, WarningKind};
use crate::stt::transcriber::Transcriber;
use crate::timeline::SegmentTimeline;
use crate::translate::translator::Translator;
use crate::tts::synthesizer::Synthesizer;
use futures_util::{StreamExt, stream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// File name of the composed track inside the working directory.
const TRACK_FILE_NAME: &str = "dub.wav";

/// Configuration for the dub pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Sample rate of the composed track
    pub sample_rate: u32,
    /// Fail when the transcript has no segments instead of producing silence
    pub require_speech: bool,
    /// Maximum translation requests in flight
    pub translate_concurrency: usize,
    /// Maximum synthesis requests in flight
    pub synthesis_concurrency: usize,
    /// Leave the working directory on disk after the job
    pub keep_workdir: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::OUTPUT_SAMPLE_RATE,
            require_speech: true,
            translate_concurrency: defaults::TRANSLATE_CONCURRENCY,
            synthesis_concurrency: defaults::SYNTHESIS_CONCURRENCY,
            keep_workdir: false,
        }
    }
}

/// One video to dub.
#[derive(Debug, Clone, PartialEq)]
pub struct DubJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub target: TargetLanguage,
    /// Also write the composed track here as WAV.
    pub audio_out: Option<PathBuf>,
}

impl DubJob {
    /// A job writing to the default output path next to `input`.
    pub fn new(input: impl Into<PathBuf>, target: TargetLanguage) -> Self {
        let input = input.into();
        let output = default_output_path(&input, target);
        Self {
            input,
            output,
            target,
            audio_out: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_audio_out(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_out = Some(path.into());
        self
    }
}

/// `<stem>_<code>_dubbed.<ext>` next to the input.
pub fn default_output_path(input: &Path, target: TargetLanguage) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    let name = match input.extension() {
        Some(ext) => format!(
            "{}_{}_{}.{}",
            stem,
            target.code(),
            defaults::OUTPUT_SUFFIX,
            ext.to_string_lossy()
        ),
        None => format!("{}_{}_{}", stem, target.code(), defaults::OUTPUT_SUFFIX),
    };
    input.with_file_name(name)
}

/// Runs dub jobs against a fixed set of backends.
///
/// The transcriber is shared: load the model once and reuse the pipeline
/// for every job in the process.
pub struct DubPipeline {
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    media: Arc<dyn MediaBackend>,
    composer: TrackComposer,
    config: PipelineConfig,
}

impl std::fmt::Debug for DubPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DubPipeline")
            .field("transcriber", &self.transcriber.model_name())
            .field("translator", &self.translator.name())
            .field("synthesizer", &self.synthesizer.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DubPipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
        media: Arc<dyn MediaBackend>,
        config: PipelineConfig,
    ) -> Self {
        let composer = TrackComposer::new(ComposerConfig {
            sample_rate: config.sample_rate,
            require_segments: false,
        });
        Self {
            transcriber,
            translator,
            synthesizer,
            media,
            composer,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Dub one video.
    ///
    /// Nothing is written to `job.output` unless every stage succeeds. Dropping
    /// the returned future cancels the job; in-flight requests are abandoned
    /// and child processes killed.
    ///
    /// # Errors
    /// - `AudioExtraction` if the input has no decodable audio
    /// - `Transcription` if speech recognition fails
    /// - `EmptyTimeline` if no speech was found and speech is required
    /// - `Mux` if the output video cannot be written
    pub async fn run(&self, job: &DubJob, events: &dyn EventSink) -> Result<DubReport> {
        let started = Instant::now();

        if job.output == job.input {
            return Err(DubError::ConfigInvalidValue {
                key: "output".to_string(),
                message: "output path must differ from the input".to_string(),
            });
        }

        // Created next to the output so the final rename stays on one filesystem.
        let output_dir = match job.output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let workdir = tempfile::Builder::new()
            .prefix(".redub-")
            .keep(self.config.keep_workdir)
            .tempdir_in(&output_dir)?;

        events.emit(DubEvent::StageStarted {
            stage: Stage::Extract,
        });
        let source = self
            .media
            .extract_audio(&job.input, defaults::TRANSCRIBE_SAMPLE_RATE)
            .await?;
        let total_duration = source.duration();
        events.emit(DubEvent::AudioExtracted {
            duration: total_duration,
            sample_rate: source.sample_rate(),
        });

        events.emit(DubEvent::StageStarted {
            stage: Stage::Transcribe,
        });
        let (mut timeline, source_language) = self.transcribe(source).await?;
        events.emit(DubEvent::Transcribed {
            segments: timeline.len(),
            language: source_language.clone(),
        });
        if timeline.is_empty() && self.config.require_speech {
            return Err(DubError::EmptyTimeline);
        }

        let mut warnings = Vec::new();

        events.emit(DubEvent::StageStarted {
            stage: Stage::Translate,
        });
        let translated = self
            .translate(&mut timeline, job.target, events, &mut warnings)
            .await?;

        events.emit(DubEvent::StageStarted {
            stage: Stage::Synthesize,
        });
        let clips = self
            .synthesize(&timeline, job.target, events, &mut warnings)
            .await;

        events.emit(DubEvent::StageStarted {
            stage: Stage::Compose,
        });
        let composition = self.composer.compose(&timeline, clips, total_duration)?;
        for dropped in &composition.dropped {
            let warning = DubWarning::new(
                dropped.segment_index,
                WarningKind::ClipOutOfBounds,
                dropped.to_error().to_string(),
            );
            events.emit(DubEvent::Warning(warning.clone()));
            warnings.push(warning);
        }
        let voiced_clips = composition
            .placements
            .iter()
            .filter(|p| p.written_samples > 0)
            .count();
        let overruns = composition
            .placements
            .iter()
            .filter(|p| p.overrun > 0.0)
            .count();
        let mixed_samples: usize = composition.placements.iter().map(|p| p.mixed_samples).sum();
        events.emit(DubEvent::Composed {
            placed: composition.placements.len(),
            dropped: composition.dropped.len(),
            overruns,
        });

        let track = composition.track;
        let track_path = workdir.path().join(TRACK_FILE_NAME);
        write_wav(&track_path, track.samples(), track.sample_rate())?;

        events.emit(DubEvent::StageStarted { stage: Stage::Mux });
        let staged_output = workdir.path().join(staged_output_name(&job.output));
        self.media
            .replace_audio(&job.input, &track_path, &staged_output)
            .await?;
        tokio::fs::rename(&staged_output, &job.output).await?;
        // Only after the output is in place; a failed job leaves neither file.
        if let Some(audio_out) = &job.audio_out {
            tokio::fs::copy(&track_path, audio_out).await?;
        }

        let workdir = if self.config.keep_workdir {
            Some(workdir.path().to_path_buf())
        } else {
            None
        };
        let elapsed = started.elapsed();
        events.emit(DubEvent::Finished {
            output: job.output.clone(),
            elapsed,
        });

        Ok(DubReport {
            output: job.output.clone(),
            audio_out: job.audio_out.clone(),
            workdir,
            target: job.target,
            source_language,
            total_duration: track.total_duration(),
            segments: timeline.len(),
            translated,
            voiced_clips,
            overruns,
            mixed_samples,
            warnings,
            elapsed,
        })
    }

    async fn transcribe(&self, source: AudioClip) -> Result<(SegmentTimeline, String)> {
        let transcriber = Arc::clone(&self.transcriber);
        let samples = source.into_samples();
        let transcript = tokio::task::spawn_blocking(move || transcriber.transcribe(&samples))
            .await
            .map_err(|e| DubError::Transcription {
                message: format!("transcription worker failed: {}", e),
            })??;

        let timeline = SegmentTimeline::from_transcript(transcript.segments)?;
        Ok((timeline, transcript.language))
    }

    /// Attach a translation to every segment, falling back to the source
    /// text where translation fails. Returns the number of segments that
    /// were actually translated.
    async fn translate(
        &self,
        timeline: &mut SegmentTimeline,
        target: TargetLanguage,
        events: &dyn EventSink,
        warnings: &mut Vec<DubWarning>,
    ) -> Result<usize> {
        let translator = self.translator.as_ref();
        let texts: Vec<String> = timeline
            .iter()
            .map(|segment| segment.source_text().to_string())
            .collect();

        let results: Vec<(String, Option<Result<String>>)> = stream::iter(texts)
            .map(|text| async move {
                if text.trim().is_empty() {
                    return (text, None);
                }
                let result = translator.translate(&text, target).await;
                (text, Some(result))
            })
            .buffered(self.config.translate_concurrency.max(1))
            .collect()
            .await;

        let mut translated = 0;
        for (index, (source_text, result)) in results.into_iter().enumerate() {
            let text = match result {
                None => source_text,
                Some(Ok(text)) => {
                    translated += 1;
                    text
                }
                Some(Err(e)) => {
                    let warning =
                        DubWarning::new(index, WarningKind::TranslationFallback, e.to_string());
                    events.emit(DubEvent::Warning(warning.clone()));
                    warnings.push(warning);
                    source_text
                }
            };
            events.emit(DubEvent::SegmentTranslated {
                index,
                text: text.clone(),
            });
            timeline.attach_translation(index, text)?;
        }
        Ok(translated)
    }

    /// Synthesize every segment with text. Segments whose synthesis fails
    /// get no clip and stay silent.
    async fn synthesize(
        &self,
        timeline: &SegmentTimeline,
        target: TargetLanguage,
        events: &dyn EventSink,
        warnings: &mut Vec<DubWarning>,
    ) -> Vec<SynthesizedClip> {
        let synthesizer = self.synthesizer.as_ref();
        let sample_rate = self.config.sample_rate;
        let texts: Vec<String> = timeline
            .iter()
            .map(|segment| {
                segment
                    .translated_text()
                    .unwrap_or(segment.source_text())
                    .to_string()
            })
            .collect();

        let results: Vec<Option<Result<AudioClip>>> = stream::iter(texts)
            .map(|text| async move {
                if text.trim().is_empty() {
                    return None;
                }
                let result = synthesizer.synthesize(&text, target).await;
                Some(result.map(|clip| clip.resampled(sample_rate)))
            })
            .buffered(self.config.synthesis_concurrency.max(1))
            .collect()
            .await;

        let mut clips = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                None => {}
                Some(Ok(audio)) => {
                    events.emit(DubEvent::SegmentSynthesized {
                        index,
                        duration: audio.duration(),
                    });
                    clips.push(SynthesizedClip::new(index, audio));
                }
                Some(Err(e)) => {
                    let warning =
                        DubWarning::new(index, WarningKind::SynthesisSkipped, e.to_string());
                    events.emit(DubEvent::Warning(warning.clone()));
                    warnings.push(warning);
                }
            }
        }
        clips
    }
}

/// Name of the muxer's output inside the working directory; keeps the
/// final extension so the container format is inferred the same way.
fn staged_output_name(output: &Path) -> String {
    match output.extension() {
        Some(ext) => format!("output.{}", ext.to_string_lossy()),
        None => "output".to_string(),
    }
}
