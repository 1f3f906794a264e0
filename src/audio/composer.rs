//! Segment-timed track composition.
//!
//! Places every synthesized clip at its segment's original start time in a
//! single track whose length is fixed to the source audio duration.
//!
//! Timing conflicts are resolved as follows:
//!
//! - **Gaps**: the track starts silent; anything no clip covers stays silent,
//!   including the windows of segments whose synthesis failed.
//! - **Order**: clips are placed by ascending segment start, ties broken by
//!   segment index.
//! - **Overrun**: a clip longer than its segment window is written in full and
//!   may run into the next window. It is cut only at the end of the track.
//! - **Overlap**: where a clip lands on samples already written by an earlier
//!   clip, the two are mixed additively with saturation at the i16 range.
//! - **Under-run**: the rest of a window after a short clip stays silent; no
//!   time-stretching is applied.
//! - **Out of bounds**: a clip anchored at or after the track end is dropped
//!   and reported in [`Composition::dropped`].
//!
//! Composition is a pure function of its inputs, so the same timeline and
//! clips always produce byte-identical output.

use crate::audio::clip::SynthesizedClip;
use crate::defaults;
use crate::error::{DubError, Result};
use crate::timeline::SegmentTimeline;

/// Configuration for the track composer.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerConfig {
    /// Sample rate of the composed track in Hz.
    pub sample_rate: u32,
    /// Fail with `EmptyTimeline` instead of producing an all-silent track.
    pub require_segments: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::OUTPUT_SAMPLE_RATE,
            require_segments: false,
        }
    }
}

/// The flat audio track produced by composition.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedTrack {
    total_duration: f64,
    sample_rate: u32,
    samples: Vec<i16>,
}

impl ComposedTrack {
    /// Duration of the track in seconds, exactly as requested.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    /// Samples covering `[from, to)` seconds, clamped to the track.
    pub fn slice(&self, from: f64, to: f64) -> &[i16] {
        let len = self.samples.len();
        let a = seconds_to_index(from, self.sample_rate).min(len);
        let b = seconds_to_index(to, self.sample_rate).clamp(a, len);
        &self.samples[a..b]
    }

    /// Little-endian byte representation of the samples.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// How one clip was written into the track.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub segment_index: usize,
    /// First sample index written.
    pub start_sample: usize,
    /// Number of clip samples that made it into the track.
    pub written_samples: usize,
    /// Seconds by which the clip runs past its segment's end (0 if it fits).
    pub overrun: f64,
    /// Samples mixed on top of audio from earlier clips.
    pub mixed_samples: usize,
    /// Samples cut off at the end of the track.
    pub truncated_samples: usize,
}

/// A clip that could not be placed because it starts past the track end.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedClip {
    pub segment_index: usize,
    pub start: f64,
    pub track_end: f64,
}

impl DroppedClip {
    /// The bounds error this drop corresponds to.
    pub fn to_error(&self) -> DubError {
        DubError::CompositionBounds {
            index: self.segment_index,
            start: self.start,
            track_end: self.track_end,
        }
    }
}

/// Result of composing a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub track: ComposedTrack,
    pub placements: Vec<Placement>,
    pub dropped: Vec<DroppedClip>,
}

/// Merges time-anchored clips into a single track.
#[derive(Debug, Clone, Default)]
pub struct TrackComposer {
    config: ComposerConfig,
}

impl TrackComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose `clips` against `timeline` into a track of `total_duration`
    /// seconds.
    ///
    /// # Errors
    /// - `InvalidDuration` if `total_duration` is negative or not finite
    /// - `EmptyTimeline` if segments are required and the timeline is empty
    /// - `IndexOutOfRange` if a clip refers to a segment not in the timeline
    pub fn compose(
        &self,
        timeline: &SegmentTimeline,
        clips: Vec<SynthesizedClip>,
        total_duration: f64,
    ) -> Result<Composition> {
        if !total_duration.is_finite() || total_duration < 0.0 {
            return Err(DubError::InvalidDuration {
                duration: total_duration,
            });
        }
        if self.config.require_segments && timeline.is_empty() {
            return Err(DubError::EmptyTimeline);
        }

        let sample_rate = self.config.sample_rate.max(1);
        let total_samples = seconds_to_index(total_duration, sample_rate);
        let mut buffer = vec![0i16; total_samples];

        // Resolve anchors up front so a bad index fails before any writing.
        let mut anchored = Vec::with_capacity(clips.len());
        for clip in clips {
            let index = clip.segment_index();
            let segment = timeline.get(index).ok_or(DubError::IndexOutOfRange {
                index,
                len: timeline.len(),
            })?;
            anchored.push((segment.start(), segment.end(), clip));
        }
        anchored.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then(a.2.segment_index().cmp(&b.2.segment_index()))
        });

        let mut placements = Vec::with_capacity(anchored.len());
        let mut dropped = Vec::new();
        // Highest sample index written so far (exclusive).
        let mut voiced_until = 0usize;

        for (start, end, clip) in anchored {
            let segment_index = clip.segment_index();
            let start_sample = seconds_to_index(start, sample_rate);

            if start_sample >= total_samples {
                dropped.push(DroppedClip {
                    segment_index,
                    start,
                    track_end: total_duration,
                });
                continue;
            }

            let overrun = (clip.intrinsic_duration() - (end - start)).max(0.0);
            let audio = clip.into_audio().resampled(sample_rate);
            let samples = audio.samples();

            let end_sample = start_sample.saturating_add(samples.len()).min(total_samples);
            let written_samples = end_sample - start_sample;

            for (slot, &sample) in buffer[start_sample..end_sample].iter_mut().zip(samples) {
                *slot = slot.saturating_add(sample);
            }

            let mixed_samples = voiced_until.clamp(start_sample, end_sample) - start_sample;
            voiced_until = voiced_until.max(end_sample);

            placements.push(Placement {
                segment_index,
                start_sample,
                written_samples,
                overrun,
                mixed_samples,
                truncated_samples: samples.len() - written_samples,
            });
        }

        Ok(Composition {
            track: ComposedTrack {
                total_duration,
                sample_rate,
                samples: buffer,
            },
            placements,
            dropped,
        })
    }
}

fn seconds_to_index(seconds: f64, sample_rate: u32) -> usize {
    (seconds.max(0.0) * sample_rate as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::clip::AudioClip;
    use crate::stt::transcriber::TranscriptSegment;

    const RATE: u32 = 1000;

    fn composer() -> TrackComposer {
        TrackComposer::new(ComposerConfig {
            sample_rate: RATE,
            require_segments: false,
        })
    }

    fn timeline(windows: &[(f64, f64)]) -> SegmentTimeline {
        SegmentTimeline::from_transcript(
            windows
                .iter()
                .enumerate()
                .map(|(i, &(start, end))| TranscriptSegment {
                    start,
                    end,
                    text: format!("segment {i}"),
                })
                .collect(),
        )
        .unwrap()
    }

    fn clip(index: usize, seconds: f64, value: i16) -> SynthesizedClip {
        let len = (seconds * RATE as f64).round() as usize;
        SynthesizedClip::new(index, AudioClip::new(vec![value; len], RATE))
    }

    #[test]
    fn empty_timeline_yields_silent_full_length_track() {
        let result = composer().compose(&SegmentTimeline::new(), vec![], 3.25).unwrap();

        assert_eq!(result.track.total_duration(), 3.25);
        assert_eq!(result.track.samples().len(), 3250);
        assert!(result.track.samples().iter().all(|&s| s == 0));
        assert!(result.placements.is_empty());
    }

    #[test]
    fn empty_timeline_fails_when_segments_required() {
        let composer = TrackComposer::new(ComposerConfig {
            sample_rate: RATE,
            require_segments: true,
        });
        let result = composer.compose(&SegmentTimeline::new(), vec![], 1.0);
        assert!(matches!(result, Err(DubError::EmptyTimeline)));
    }

    #[test]
    fn short_clip_leaves_rest_of_window_silent() {
        let tl = timeline(&[(1.0, 2.0)]);
        let result = composer().compose(&tl, vec![clip(0, 0.5, 700)], 3.0).unwrap();
        let track = &result.track;

        assert!(track.slice(0.0, 1.0).iter().all(|&s| s == 0));
        assert!(track.slice(1.0, 1.5).iter().all(|&s| s == 700));
        assert_eq!(track.slice(1.0, 1.5).len(), 500);
        assert!(track.slice(1.5, 3.0).iter().all(|&s| s == 0));
        assert_eq!(result.placements[0].overrun, 0.0);
    }

    #[test]
    fn overrun_is_written_in_full_and_mixed_with_next_clip() {
        let tl = timeline(&[(0.0, 1.0), (1.0, 2.0)]);
        let result = composer()
            .compose(&tl, vec![clip(0, 1.5, 100), clip(1, 1.0, 50)], 2.5)
            .unwrap();
        let track = &result.track;

        assert!(track.slice(0.0, 1.0).iter().all(|&s| s == 100));
        assert!(track.slice(1.0, 1.5).iter().all(|&s| s == 150));
        assert!(track.slice(1.5, 2.0).iter().all(|&s| s == 50));
        assert!(track.slice(2.0, 2.5).iter().all(|&s| s == 0));

        assert_eq!(result.placements[0].overrun, 0.5);
        assert_eq!(result.placements[0].mixed_samples, 0);
        assert_eq!(result.placements[1].mixed_samples, 500);
    }

    #[test]
    fn mixing_saturates_at_amplitude_range() {
        let tl = timeline(&[(0.0, 1.0), (0.0, 1.0)]);
        let result = composer()
            .compose(&tl, vec![clip(0, 1.0, 30000), clip(1, 1.0, 10000)], 1.0)
            .unwrap();
        assert!(result.track.samples().iter().all(|&s| s == i16::MAX));

        let result = composer()
            .compose(&tl, vec![clip(0, 1.0, -30000), clip(1, 1.0, -10000)], 1.0)
            .unwrap();
        assert!(result.track.samples().iter().all(|&s| s == i16::MIN));
    }

    #[test]
    fn clip_is_truncated_only_at_track_end() {
        let tl = timeline(&[(1.5, 1.8)]);
        let result = composer().compose(&tl, vec![clip(0, 1.0, 9)], 2.0).unwrap();

        assert_eq!(result.track.samples().len(), 2000);
        assert!(result.track.slice(1.5, 2.0).iter().all(|&s| s == 9));
        assert_eq!(result.placements[0].written_samples, 500);
        assert_eq!(result.placements[0].truncated_samples, 500);
    }

    #[test]
    fn clip_past_track_end_is_dropped_not_fatal() {
        let tl = timeline(&[(0.0, 0.5), (5.0, 6.0)]);
        let result = composer()
            .compose(&tl, vec![clip(0, 0.5, 1), clip(1, 1.0, 2)], 2.0)
            .unwrap();

        assert_eq!(result.placements.len(), 1);
        assert_eq!(result.dropped.len(), 1);
        assert_eq!(result.dropped[0].segment_index, 1);
        assert!(matches!(
            result.dropped[0].to_error(),
            DubError::CompositionBounds { index: 1, .. }
        ));
        assert!(result.track.samples().iter().all(|&s| s == 0 || s == 1));
    }

    #[test]
    fn clip_exactly_at_track_end_is_dropped() {
        let tl = timeline(&[(2.0, 2.5)]);
        let result = composer().compose(&tl, vec![clip(0, 0.5, 1)], 2.0).unwrap();
        assert_eq!(result.dropped.len(), 1);
    }

    #[test]
    fn total_duration_is_independent_of_clip_lengths() {
        let tl = timeline(&[(0.0, 0.1), (0.5, 0.6), (0.9, 1.0)]);
        let clips = vec![clip(0, 3.0, 1), clip(1, 0.01, 1), clip(2, 7.0, 1)];
        let result = composer().compose(&tl, clips, 1.234).unwrap();

        assert_eq!(result.track.total_duration(), 1.234);
        assert_eq!(result.track.samples().len(), 1234);
    }

    #[test]
    fn clips_are_placed_in_start_order_regardless_of_input_order() {
        let tl = timeline(&[(0.0, 1.0), (0.5, 1.0)]);
        let forward = composer()
            .compose(&tl, vec![clip(0, 1.0, 10), clip(1, 0.5, 20)], 1.0)
            .unwrap();
        let reversed = composer()
            .compose(&tl, vec![clip(1, 0.5, 20), clip(0, 1.0, 10)], 1.0)
            .unwrap();

        assert_eq!(forward, reversed);
        assert_eq!(forward.placements[0].segment_index, 0);
        assert_eq!(forward.placements[1].segment_index, 1);
    }

    #[test]
    fn equal_starts_are_ordered_by_segment_index() {
        let tl = timeline(&[(0.5, 1.0), (0.5, 1.0), (0.5, 1.0)]);
        let result = composer()
            .compose(&tl, vec![clip(2, 0.1, 1), clip(0, 0.1, 1), clip(1, 0.1, 1)], 1.0)
            .unwrap();
        let order: Vec<_> = result.placements.iter().map(|p| p.segment_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn composition_is_deterministic() {
        let tl = timeline(&[(0.0, 0.7), (0.6, 1.4), (1.2, 2.0)]);
        let make_clips = || {
            vec![
                SynthesizedClip::new(0, AudioClip::new((0..900).map(|i| (i % 300) as i16).collect(), 1000)),
                SynthesizedClip::new(1, AudioClip::new((0..1600).map(|i| (i % 97) as i16 * 3).collect(), 2000)),
                SynthesizedClip::new(2, AudioClip::new(vec![-5; 400], 500)),
            ]
        };

        let first = composer().compose(&tl, make_clips(), 2.5).unwrap();
        let second = composer().compose(&tl, make_clips(), 2.5).unwrap();
        assert_eq!(first.track.to_le_bytes(), second.track.to_le_bytes());
    }

    #[test]
    fn clip_at_other_rate_is_resampled() {
        let tl = timeline(&[(0.0, 1.0)]);
        let clip = SynthesizedClip::new(0, AudioClip::new(vec![42; 2000], 4000));
        let result = composer().compose(&tl, vec![clip], 1.0).unwrap();

        assert_eq!(result.placements[0].written_samples, 500);
        assert!(result.track.slice(0.0, 0.5).iter().all(|&s| s == 42));
        assert!(result.track.slice(0.5, 1.0).iter().all(|&s| s == 0));
    }

    #[test]
    fn unknown_segment_index_is_an_error() {
        let tl = timeline(&[(0.0, 1.0)]);
        let result = composer().compose(&tl, vec![clip(3, 0.5, 1)], 1.0);
        assert!(matches!(
            result,
            Err(DubError::IndexOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let tl = SegmentTimeline::new();
        assert!(matches!(
            composer().compose(&tl, vec![], -1.0),
            Err(DubError::InvalidDuration { .. })
        ));
        assert!(matches!(
            composer().compose(&tl, vec![], f64::INFINITY),
            Err(DubError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn segment_without_clip_stays_silent() {
        let tl = timeline(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        let result = composer()
            .compose(&tl, vec![clip(0, 1.0, 5), clip(2, 1.0, 5)], 3.0)
            .unwrap();

        assert!(result.track.slice(1.0, 2.0).iter().all(|&s| s == 0));
        assert!(result.track.slice(2.0, 3.0).iter().all(|&s| s == 5));
    }
}
