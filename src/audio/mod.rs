//! Audio buffers, WAV helpers and segment-timed composition.

pub mod clip;
pub mod composer;
pub mod wav;

pub use clip::{AudioClip, SynthesizedClip};
pub use composer::{ComposedTrack, ComposerConfig, Composition, DroppedClip, Placement, TrackComposer};
