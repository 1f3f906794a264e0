//! Dub job orchestration.
//!
//! A job runs six stages in order: extract, transcribe, translate,
//! synthesize, compose and mux. Progress is reported through an
//! [`EventSink`] and the outcome summarized in a [`DubReport`].

pub mod events;
pub mod orchestrator;
pub mod report;

pub use events::{CollectorSink, DubEvent, EventSink, NullSink, Stage};
pub use orchestrator::{DubJob, DubPipeline, PipelineConfig, default_output_path};
pub use report::{DubReport, DubWarning, WarningKind};
