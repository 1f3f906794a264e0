//! Synthesized audio clips.

/// Mono 16-bit PCM audio with its sample rate.
///
/// This is what speech synthesizers return. The duration is whatever the
/// engine produced for the text; callers cannot ask for a specific length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioClip {
    /// Create a clip from mono samples.
    ///
    /// A zero sample rate is treated as 1 Hz so durations stay finite.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate: sample_rate.max(1),
        }
    }

    /// A clip of `seconds` of silence.
    pub fn silence(seconds: f64, sample_rate: u32) -> Self {
        let len = (seconds.max(0.0) * sample_rate as f64).round() as usize;
        Self::new(vec![0; len], sample_rate)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, derived from the sample count.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Return this clip at `sample_rate`, using linear interpolation.
    pub fn resampled(self, sample_rate: u32) -> AudioClip {
        if self.sample_rate == sample_rate {
            return self;
        }
        let samples = crate::audio::wav::resample(&self.samples, self.sample_rate, sample_rate);
        AudioClip::new(samples, sample_rate)
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

/// A synthesized clip anchored to the timeline segment it voices.
///
/// `segment_index` is a back-reference used only to look up the anchor
/// time; the clip does not own the segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedClip {
    segment_index: usize,
    audio: AudioClip,
}

impl SynthesizedClip {
    pub fn new(segment_index: usize, audio: AudioClip) -> Self {
        Self {
            segment_index,
            audio,
        }
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn audio(&self) -> &AudioClip {
        &self.audio
    }

    /// Duration produced by the synthesizer, in seconds.
    pub fn intrinsic_duration(&self) -> f64 {
        self.audio.duration()
    }

    pub fn into_audio(self) -> AudioClip {
        self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_derives_from_sample_count() {
        let clip = AudioClip::new(vec![0; 12000], 24000);
        assert_eq!(clip.duration(), 0.5);
        assert_eq!(clip.len(), 12000);
    }

    #[test]
    fn zero_sample_rate_is_clamped() {
        let clip = AudioClip::new(vec![1, 2, 3], 0);
        assert_eq!(clip.sample_rate(), 1);
        assert_eq!(clip.duration(), 3.0);
    }

    #[test]
    fn silence_has_requested_length() {
        let clip = AudioClip::silence(1.5, 1000);
        assert_eq!(clip.len(), 1500);
        assert!(clip.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn resampled_same_rate_is_identity() {
        let clip = AudioClip::new(vec![1, 2, 3, 4], 16000);
        assert_eq!(clip.clone().resampled(16000), clip);
    }

    #[test]
    fn synthesized_clip_reports_intrinsic_duration() {
        let clip = SynthesizedClip::new(4, AudioClip::new(vec![0; 1500], 1000));
        assert_eq!(clip.segment_index(), 4);
        assert_eq!(clip.intrinsic_duration(), 1.5);
    }
}
