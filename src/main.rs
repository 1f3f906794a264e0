use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use redub::app::{DubOptions, run_dub_command};
use redub::cli::{Cli, Commands, ConfigAction, ModelsAction};
use redub::config::Config;
use redub::diagnostics::check_dependencies;
use redub::error::DubError;
use redub::language::TargetLanguage;
use redub::models::catalog::{default_model, list_models};
use redub::models::download::{download_model, format_model_info, list_installed_models};
use redub::output::format_report;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

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
            let config = load_config(cli.config.as_deref())?;
            let options = DubOptions {
                input,
                target: to,
                output,
                model,
                tts,
                audio_out,
                keep_workdir,
                no_download,
                quiet: cli.quiet,
                verbosity: cli.verbose,
            };
            match run_dub_command(config, options).await {
                Ok(report) => {
                    if !cli.quiet {
                        eprintln!("{}", format_report(&report));
                    }
                    println!("{}", report.output.display());
                }
                Err(err) => exit_with_error(&err),
            }
        }
        Commands::Languages => {
            println!("Supported target languages:");
            for language in TargetLanguage::ALL {
                println!("  {:10} {}", language.name(), language.code().dimmed());
            }
        }
        Commands::Models { action } => {
            handle_models_command(action).await?;
        }
        Commands::Check => {
            let config = load_config(cli.config.as_deref())?;
            println!("redub {}\n", redub::version_string());
            if !check_dependencies(&config) {
                std::process::exit(1);
            }
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut redub::cli::Cli::command(),
                "redub",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/redub/config.toml)
/// 3. Built-in defaults
///
/// Environment variable overrides are applied on top.
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };
    Ok(config.with_env_overrides()?)
}

/// Print a failed job with the stage it failed in, then exit.
fn exit_with_error(err: &DubError) -> ! {
    eprintln!(
        "{} {} {}",
        "error:".red().bold(),
        format!("[{}]", err.stage()).dimmed(),
        err
    );
    if matches!(err, DubError::Cancelled) {
        std::process::exit(130);
    }
    std::process::exit(1);
}

/// Handle model management commands.
async fn handle_models_command(action: ModelsAction) -> Result<()> {
    match action {
        ModelsAction::List => {
            println!("Available models (default: {}):", default_model().name.green());
            for model in list_models() {
                println!("  {}", format_model_info(model));
            }
            let installed = list_installed_models();
            let unknown: Vec<_> = installed
                .iter()
                .filter(|name| !list_models().iter().any(|m| m.name == name.as_str()))
                .collect();
            if !unknown.is_empty() {
                println!();
                println!("Other installed models:");
                for name in unknown {
                    println!("  {}", name);
                }
            }
        }
        ModelsAction::Install { name } => {
            let path = download_model(&name, true).await?;
            println!("Model '{}' installed successfully", name);
            println!("Location: {}", path.display());
        }
    }
    Ok(())
}

/// Handle configuration commands.
fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    match action {
        ConfigAction::Dump => {
            print!("{}", Config::dump_template()?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
