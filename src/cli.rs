//! Command-line interface for redub
//!
//! Provides argument parsing using clap derive macros.

use crate::config::TtsBackend;
use crate::language::TargetLanguage;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Re-dub videos into another language, keeping the original speech timing
#[derive(Parser, Debug)]
#[command(
    name = "redub",
    version,
    about = "Re-dub videos into another language, keeping the original speech timing"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (warnings are still shown)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-segment text, -vv: clip durations)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_language(s: &str) -> Result<TargetLanguage, String> {
    s.parse().map_err(|e: crate::error::DubError| e.to_string())
}

fn parse_tts_backend(s: &str) -> Result<TtsBackend, String> {
    s.parse().map_err(|e: crate::error::DubError| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dub a video into the target language
    Dub {
        /// Input video file
        input: PathBuf,

        /// Target language: Hindi, Kannada, Telugu, Tamil, French (or hi, kn, te, ta, fr)
        #[arg(long, short = 't', value_name = "LANG", value_parser = parse_language)]
        to: Option<TargetLanguage>,

        /// Output video (default: <input>_<code>_dubbed.<ext> next to the input)
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,

        /// Whisper model (default: base, multilingual)
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Speech synthesis backend (google, espeak)
        #[arg(long, value_name = "BACKEND", value_parser = parse_tts_backend)]
        tts: Option<TtsBackend>,

        /// Also write the composed dub track as WAV
        #[arg(long, value_name = "PATH")]
        audio_out: Option<PathBuf>,

        /// Keep the job's working directory for inspection
        #[arg(long)]
        keep_workdir: bool,

        /// Prevent automatic model download if the model is missing
        #[arg(long)]
        no_download: bool,
    },

    /// List supported target languages
    Languages,

    /// Manage Whisper models
    Models {
        /// Action to perform
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// Check that external tools are available
    Check,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the default configuration as TOML
    Dump,
    /// Print the configuration file path
    Path,
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List available models
    List,
    /// Download and install a model
    Install {
        /// Model name (e.g., base, small, large-v3-turbo)
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dub_minimal() {
        let cli = Cli::try_parse_from(["redub", "dub", "talk.mp4", "--to", "French"]).unwrap();
        match cli.command {
            Commands::Dub {
                input,
                to,
                output,
                model,
                tts,
                audio_out,
                keep_workdir,
                no_download,
            } => {
                assert_eq!(input, PathBuf::from("talk.mp4"));
                assert_eq!(to, Some(TargetLanguage::French));
                assert!(output.is_none());
                assert!(model.is_none());
                assert!(tts.is_none());
                assert!(audio_out.is_none());
                assert!(!keep_workdir);
                assert!(!no_download);
            }
            other => panic!("Expected Dub command, got {:?}", other),
        }
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_dub_all_options() {
        let cli = Cli::try_parse_from([
            "redub",
            "dub",
            "in.mkv",
            "-t",
            "te",
            "-o",
            "out.mkv",
            "--model",
            "small",
            "--tts",
            "espeak",
            "--audio-out",
            "dub.wav",
            "--keep-workdir",
            "--no-download",
        ])
        .unwrap();

        match cli.command {
            Commands::Dub {
                to,
                output,
                model,
                tts,
                audio_out,
                keep_workdir,
                no_download,
                ..
            } => {
                assert_eq!(to, Some(TargetLanguage::Telugu));
                assert_eq!(output, Some(PathBuf::from("out.mkv")));
                assert_eq!(model.as_deref(), Some("small"));
                assert_eq!(tts, Some(TtsBackend::Espeak));
                assert_eq!(audio_out, Some(PathBuf::from("dub.wav")));
                assert!(keep_workdir);
                assert!(no_download);
            }
            other => panic!("Expected Dub command, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_language_is_rejected() {
        let err = Cli::try_parse_from(["redub", "dub", "a.mp4", "--to", "German"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_unknown_tts_backend_is_rejected() {
        let result = Cli::try_parse_from(["redub", "dub", "a.mp4", "--tts", "polly"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dub_requires_input() {
        assert!(Cli::try_parse_from(["redub", "dub"]).is_err());
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["redub", "-vv", "languages"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_options_after_command() {
        let cli = Cli::try_parse_from(["redub", "check", "--config", "/tmp/c.toml", "-q"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_parse_models_install() {
        let cli = Cli::try_parse_from(["redub", "models", "install", "small"]).unwrap();
        match cli.command {
            Commands::Models {
                action: ModelsAction::Install { name },
            } => assert_eq!(name, "small"),
            other => panic!("Expected models install, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_actions() {
        let cli = Cli::try_parse_from(["redub", "config", "dump"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Dump
            }
        ));
        let cli = Cli::try_parse_from(["redub", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Path
            }
        ));
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["redub", "completions", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["redub"]).is_err());
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["redub", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
