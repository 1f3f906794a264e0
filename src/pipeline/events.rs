//! Progress events emitted while a dub job runs.

use crate::pipeline::report::DubWarning;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// Job stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Transcribe,
    Translate,
    Synthesize,
    Compose,
    Mux,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Extract => "extracting audio",
            Stage::Transcribe => "transcribing",
            Stage::Translate => "translating",
            Stage::Synthesize => "synthesizing speech",
            Stage::Compose => "composing track",
            Stage::Mux => "muxing video",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A structured progress event.
#[derive(Debug, Clone, PartialEq)]
pub enum DubEvent {
    StageStarted {
        stage: Stage,
    },
    AudioExtracted {
        duration: f64,
        sample_rate: u32,
    },
    Transcribed {
        segments: usize,
        language: String,
    },
    SegmentTranslated {
        index: usize,
        text: String,
    },
    SegmentSynthesized {
        index: usize,
        duration: f64,
    },
    Composed {
        placed: usize,
        dropped: usize,
        overruns: usize,
    },
    Warning(DubWarning),
    Finished {
        output: PathBuf,
        elapsed: Duration,
    },
}

/// Receiver of pipeline events.
///
/// Called from the job's task; implementations must not block for long.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DubEvent);
}

impl<F> EventSink for F
where
    F: Fn(DubEvent) + Send + Sync,
{
    fn emit(&self, event: DubEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: DubEvent) {}
}

/// Records events in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectorSink {
    events: Mutex<Vec<DubEvent>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DubEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Stages started so far, in order.
    pub fn stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DubEvent::StageStarted { stage } => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: DubEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn collector_records_in_order() {
        let sink = CollectorSink::new();
        sink.emit(DubEvent::StageStarted {
            stage: Stage::Extract,
        });
        sink.emit(DubEvent::AudioExtracted {
            duration: 1.0,
            sample_rate: 16000,
        });
        sink.emit(DubEvent::StageStarted {
            stage: Stage::Transcribe,
        });

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.stages(), vec![Stage::Extract, Stage::Transcribe]);
    }

    #[test]
    fn closures_are_sinks() {
        let count = AtomicUsize::new(0);
        let sink = |_event: DubEvent| {
            count.fetch_add(1, Ordering::SeqCst);
        };
        sink.emit(DubEvent::StageStarted { stage: Stage::Mux });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn event_sink_is_object_safe() {
        let sink: &dyn EventSink = &NullSink;
        sink.emit(DubEvent::StageStarted {
            stage: Stage::Compose,
        });
    }
}
