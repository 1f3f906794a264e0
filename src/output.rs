//! Terminal rendering of pipeline events and job reports.
//!
//! Everything goes to stderr so stdout stays free for scripting.

use crate::pipeline::events::DubEvent;
use crate::pipeline::report::DubReport;

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Format an event for the terminal, or `None` if it is hidden at this
/// verbosity.
///
/// `quiet` keeps only warnings. Verbosity 0 shows stage progress and
/// counts, verbosity 1 adds the extracted audio and each segment's
/// translation, verbosity 2 adds synthesized clip durations.
pub fn format_event(event: &DubEvent, quiet: bool, verbosity: u8) -> Option<String> {
    if quiet && !matches!(event, DubEvent::Warning(_)) {
        return None;
    }

    match event {
        DubEvent::StageStarted { stage } => Some(format!("{DIM}→ {stage}...{RESET}")),
        DubEvent::AudioExtracted {
            duration,
            sample_rate,
        } => (verbosity >= 1).then(|| {
            format!("{DIM}  audio: {duration:.2}s at {sample_rate} Hz{RESET}")
        }),
        DubEvent::Transcribed { segments, language } => {
            let lang = if language.is_empty() {
                String::new()
            } else {
                format!(" [{language}]")
            };
            Some(format!("  {segments} segment(s){lang}"))
        }
        DubEvent::SegmentTranslated { index, text } => {
            (verbosity >= 1).then(|| format!("{DIM}  #{index}: {text}{RESET}"))
        }
        DubEvent::SegmentSynthesized { index, duration } => {
            (verbosity >= 2).then(|| format!("{DIM}  #{index}: {duration:.2}s of speech{RESET}"))
        }
        DubEvent::Composed {
            placed,
            dropped,
            overruns,
        } => {
            let mut line = format!("  {placed} clip(s) placed");
            if *overruns > 0 {
                line.push_str(&format!(", {overruns} running past their segment"));
            }
            if *dropped > 0 {
                line.push_str(&format!(", {dropped} dropped"));
            }
            Some(line)
        }
        DubEvent::Warning(warning) => Some(format!("{YELLOW}warning: {warning}{RESET}")),
        DubEvent::Finished { output, elapsed } => Some(format!(
            "{GREEN}Wrote {} in {:.1}s{RESET}",
            output.display(),
            elapsed.as_secs_f64()
        )),
    }
}

/// Print an event to stderr.
pub fn render_event(event: &DubEvent, quiet: bool, verbosity: u8) {
    if let Some(line) = format_event(event, quiet, verbosity) {
        eprintln!("{line}");
    }
}

/// One-paragraph summary of a finished job.
pub fn format_report(report: &DubReport) -> String {
    let mut out = format!(
        "{} segment(s), {} translated, {} fallback(s), {} voiced clip(s), {:.2}s of audio",
        report.segments,
        report.translated,
        report.fallbacks(),
        report.voiced_clips,
        report.total_duration,
    );
    if let Some(audio_out) = &report.audio_out {
        out.push_str(&format!("\naudio track: {}", audio_out.display()));
    }
    if let Some(workdir) = &report.workdir {
        out.push_str(&format!("\nworking directory kept: {}", workdir.display()));
    }
    if !report.warnings.is_empty() {
        out.push_str(&format!("\n{} warning(s)", report.warnings.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::TargetLanguage;
    use crate::pipeline::events::Stage;
    use crate::pipeline::report::{DubWarning, WarningKind};
    use std::path::PathBuf;
    use std::time::Duration;

    fn warning_event() -> DubEvent {
        DubEvent::Warning(DubWarning::new(
            3,
            WarningKind::SynthesisSkipped,
            "service returned status 503",
        ))
    }

    #[test]
    fn quiet_shows_only_warnings() {
        let stage = DubEvent::StageStarted {
            stage: Stage::Translate,
        };
        assert!(format_event(&stage, true, 2).is_none());
        let line = format_event(&warning_event(), true, 0).unwrap();
        assert!(line.contains("segment 3"));
        assert!(line.contains("synthesis skipped"));
    }

    #[test]
    fn segment_lines_need_verbosity() {
        let event = DubEvent::SegmentTranslated {
            index: 1,
            text: "bonjour".to_string(),
        };
        assert!(format_event(&event, false, 0).is_none());
        assert!(format_event(&event, false, 1).unwrap().contains("bonjour"));
    }

    #[test]
    fn clip_durations_need_double_verbosity() {
        let event = DubEvent::SegmentSynthesized {
            index: 0,
            duration: 1.25,
        };
        assert!(format_event(&event, false, 1).is_none());
        assert!(format_event(&event, false, 2).unwrap().contains("1.25s"));
    }

    #[test]
    fn composed_mentions_dropped_clips() {
        let event = DubEvent::Composed {
            placed: 4,
            dropped: 1,
            overruns: 2,
        };
        let line = format_event(&event, false, 0).unwrap();
        assert!(line.contains("4 clip(s) placed"));
        assert!(line.contains("2 running past"));
        assert!(line.contains("1 dropped"));
    }

    #[test]
    fn finished_names_output() {
        let event = DubEvent::Finished {
            output: PathBuf::from("/tmp/talk_fr_dubbed.mp4"),
            elapsed: Duration::from_millis(1500),
        };
        let line = format_event(&event, false, 0).unwrap();
        assert!(line.contains("/tmp/talk_fr_dubbed.mp4"));
        assert!(line.contains("1.5s"));
    }

    #[test]
    fn report_summary_counts() {
        let report = DubReport {
            output: PathBuf::from("out.mp4"),
            audio_out: Some(PathBuf::from("dub.wav")),
            workdir: None,
            target: TargetLanguage::Telugu,
            source_language: "en".to_string(),
            total_duration: 12.5,
            segments: 5,
            translated: 4,
            voiced_clips: 5,
            overruns: 1,
            mixed_samples: 10,
            warnings: vec![DubWarning::new(2, WarningKind::TranslationFallback, "quota")],
            elapsed: Duration::from_secs(3),
        };
        let summary = format_report(&report);
        assert!(summary.starts_with("5 segment(s), 4 translated, 1 fallback(s), 5 voiced clip(s)"));
        assert!(summary.contains("audio track: dub.wav"));
        assert!(summary.contains("1 warning(s)"));
    }
}
