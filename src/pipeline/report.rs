//! Summary of a finished dub job.

use crate::language::TargetLanguage;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Kind of per-segment problem recorded during a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Translation failed; the source text was synthesized instead.
    TranslationFallback,
    /// Synthesis failed; the segment's window is silent.
    SynthesisSkipped,
    /// The clip starts at or after the end of the track and was dropped.
    ClipOutOfBounds,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WarningKind::TranslationFallback => "translation fallback",
            WarningKind::SynthesisSkipped => "synthesis skipped",
            WarningKind::ClipOutOfBounds => "clip out of bounds",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DubWarning {
    pub segment_index: usize,
    pub kind: WarningKind,
    pub message: String,
}

impl DubWarning {
    pub fn new(segment_index: usize, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            segment_index,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for DubWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "segment {}: {}: {}",
            self.segment_index, self.kind, self.message
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DubReport {
    pub output: PathBuf,
    /// Standalone copy of the composed track, when requested.
    pub audio_out: Option<PathBuf>,
    /// Working directory left on disk, when it was kept.
    pub workdir: Option<PathBuf>,
    pub target: TargetLanguage,
    /// Source language reported by the transcriber (may be empty).
    pub source_language: String,
    /// Length of the source audio and of the composed track, in seconds.
    pub total_duration: f64,
    pub segments: usize,
    /// Segments whose translation succeeded.
    pub translated: usize,
    pub voiced_clips: usize,
    /// Placed clips that run past their segment's end.
    pub overruns: usize,
    /// Samples where clips were mixed on top of each other.
    pub mixed_samples: usize,
    pub warnings: Vec<DubWarning>,
    pub elapsed: Duration,
}

impl DubReport {
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &DubWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    /// Segments that fell back to their source text.
    pub fn fallbacks(&self) -> usize {
        self.warnings_of(WarningKind::TranslationFallback).count()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
