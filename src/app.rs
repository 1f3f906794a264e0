//! Dub command entry point.
//!
//! Builds the backends from configuration, loads the Whisper model once and
//! runs a single dub job with progress rendered to stderr.

use crate::config::{Config, TtsBackend};
use crate::error::{DubError, Result};
use crate::language::TargetLanguage;
use crate::media::backend::MediaBackend;
use crate::media::ffmpeg::FfmpegMedia;
use crate::models::catalog::get_model;
use crate::models::download::ensure_model;
use crate::output::render_event;
use crate::pipeline::events::DubEvent;
use crate::pipeline::orchestrator::{DubJob, DubPipeline};
use crate::pipeline::report::DubReport;
use crate::stt::transcriber::Transcriber;
use crate::stt::whisper::WhisperTranscriber;
use crate::translate::google::GoogleTranslator;
use crate::translate::translator::Translator;
use crate::tts::espeak::EspeakTts;
use crate::tts::google::GoogleTts;
use crate::tts::synthesizer::Synthesizer;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options of `redub dub`, after parsing.
#[derive(Debug, Clone, Default)]
pub struct DubOptions {
    pub input: PathBuf,
    pub target: Option<TargetLanguage>,
    pub output: Option<PathBuf>,
    pub model: Option<String>,
    pub tts: Option<TtsBackend>,
    pub audio_out: Option<PathBuf>,
    pub keep_workdir: bool,
    pub no_download: bool,
    pub quiet: bool,
    pub verbosity: u8,
}

/// Apply command-line overrides to the configuration.
fn apply_overrides(config: &mut Config, options: &DubOptions) {
    if let Some(model) = &options.model {
        config.stt.model = model.clone();
    }
    if let Some(tts) = options.tts {
        config.tts.backend = tts;
    }
    if options.keep_workdir {
        config.dub.keep_workdir = true;
    }
}

/// Target from the command line, else from the configuration.
fn resolve_target(config: &Config, options: &DubOptions) -> Result<TargetLanguage> {
    options
        .target
        .or(config.dub.target_language)
        .ok_or_else(|| DubError::ConfigInvalidValue {
            key: "dub.target_language".to_string(),
            message: format!(
                "no target language given; pass --to <LANG> ({})",
                TargetLanguage::ALL
                    .iter()
                    .map(|l| l.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
}

/// Build the job from options, using the default output path if none given.
fn build_job(options: &DubOptions, target: TargetLanguage) -> DubJob {
    let mut job = DubJob::new(options.input.clone(), target);
    if let Some(output) = &options.output {
        job = job.with_output(output.clone());
    }
    if let Some(audio_out) = &options.audio_out {
        job = job.with_audio_out(audio_out.clone());
    }
    job
}

/// Run the dub command: extract → transcribe → translate → synthesize →
/// compose → mux. Ctrl-C cancels the job and leaves no output behind.
pub async fn run_dub_command(mut config: Config, options: DubOptions) -> Result<DubReport> {
    apply_overrides(&mut config, &options);
    let target = resolve_target(&config, &options)?;

    if !options.input.is_file() {
        return Err(DubError::AudioExtraction {
            message: format!("input file not found: {}", options.input.display()),
        });
    }

    let media: Arc<dyn MediaBackend> = Arc::new(FfmpegMedia::new(config.ffmpeg_config()));
    let transcriber = load_transcriber(&config, options.quiet, options.no_download).await?;
    let translator: Arc<dyn Translator> =
        Arc::new(GoogleTranslator::new(config.google_translate_config()?)?);
    let synthesizer = create_synthesizer(&config, Arc::clone(&media))?;

    let pipeline = DubPipeline::new(
        transcriber,
        translator,
        synthesizer,
        media,
        config.pipeline_config(),
    );
    let job = build_job(&options, target);

    let quiet = options.quiet;
    let verbosity = options.verbosity;
    let sink = move |event: DubEvent| render_event(&event, quiet, verbosity);

    if !quiet {
        eprintln!(
            "Dubbing {} into {} → {}",
            job.input.display(),
            target,
            job.output.display()
        );
    }

    tokio::select! {
        result = pipeline.run(&job, &sink) => result,
        _ = tokio::signal::ctrl_c() => Err(DubError::Cancelled),
    }
}

/// Load the configured Whisper model, downloading it if needed.
async fn load_transcriber(
    config: &Config,
    quiet: bool,
    no_download: bool,
) -> Result<Arc<dyn Transcriber>> {
    let model = config.stt.model.clone();
    if !quiet
        && config.stt.language == crate::defaults::AUTO_LANGUAGE
        && get_model(&model).is_some_and(|info| !info.multilingual)
    {
        eprintln!(
            "Model '{}' is English-only; set stt.language = \"en\" or use a multilingual model.",
            model
        );
    }

    let path = ensure_model(&model, !no_download, !quiet).await?;
    if !quiet {
        eprintln!("Loading model '{}'...", model);
    }

    let whisper_config = config.whisper_config(path);
    let transcriber = tokio::task::spawn_blocking(move || WhisperTranscriber::new(whisper_config))
        .await
        .map_err(|e| DubError::Transcription {
            message: format!("model loading failed: {}", e),
        })??;
    Ok(Arc::new(transcriber))
}

fn create_synthesizer(
    config: &Config,
    media: Arc<dyn MediaBackend>,
) -> Result<Arc<dyn Synthesizer>> {
    Ok(match config.tts.backend {
        TtsBackend::Google => Arc::new(GoogleTts::new(config.google_tts_config()?, media)?),
        TtsBackend::Espeak => Arc::new(EspeakTts::new(config.espeak_config())),
    })
}
