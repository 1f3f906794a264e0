//! Ordered transcript segments, the source of truth for dub timing.
//!
//! The timeline keeps exactly what the transcriber produced: same order,
//! same count, zero-duration and overlapping segments included. Only the
//! translated text is ever filled in afterwards, once per segment.

use crate::error::{DubError, Result};
use crate::stt::transcriber::TranscriptSegment;

/// One time-bounded unit of transcribed speech.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    start: f64,
    end: f64,
    source_text: String,
    translated_text: Option<String>,
}

impl Segment {
    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length of the original utterance window in seconds.
    pub fn window(&self) -> f64 {
        self.end - self.start
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn translated_text(&self) -> Option<&str> {
        self.translated_text.as_deref()
    }

    pub fn is_translated(&self) -> bool {
        self.translated_text.is_some()
    }
}

/// Ordered collection of segments for one dubbing job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentTimeline {
    segments: Vec<Segment>,
}

impl SegmentTimeline {
    /// An empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline from transcriber output, keeping its order.
    ///
    /// # Errors
    /// Returns `DubError::InvalidSegment` if a start time is negative or a
    /// time is not finite. An end before its start is clamped to the start.
    pub fn from_transcript(segments: Vec<TranscriptSegment>) -> Result<Self> {
        let mut timeline = Self::new();
        for segment in segments {
            timeline.push(segment.start, segment.end, segment.text)?;
        }
        Ok(timeline)
    }

    /// Append a segment at the end of the timeline.
    pub fn push(&mut self, start: f64, end: f64, source_text: impl Into<String>) -> Result<()> {
        let index = self.segments.len();
        if !start.is_finite() || !end.is_finite() {
            return Err(DubError::InvalidSegment {
                index,
                message: format!("non-finite time ({start}..{end})"),
            });
        }
        if start < 0.0 {
            return Err(DubError::InvalidSegment {
                index,
                message: format!("negative start time {start}"),
            });
        }

        self.segments.push(Segment {
            start,
            end: end.max(start),
            source_text: source_text.into(),
            translated_text: None,
        });
        Ok(())
    }

    /// Attach the translation for the segment at `index`.
    ///
    /// Translation is a one-time transition: a second call for the same
    /// index fails and leaves the first translation in place.
    pub fn attach_translation(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        let len = self.segments.len();
        let segment = self
            .segments
            .get_mut(index)
            .ok_or(DubError::IndexOutOfRange { index, len })?;

        if segment.translated_text.is_some() {
            return Err(DubError::AlreadyTranslated { index });
        }
        segment.translated_text = Some(text.into());
        Ok(())
    }

    /// True iff every segment has a translation. Vacuously true when empty.
    pub fn all_translated(&self) -> bool {
        self.segments.iter().all(Segment::is_translated)
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}
