//! System diagnostics and dependency checking.
//!
//! Verifies that the external tools a dub job shells out to are installed.

use crate::config::{Config, TtsBackend};
use crate::models::download::{is_model_installed, model_path};
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok,
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
}

/// Check if a command exists and runs with the given version flag.
fn check_command(command: &str, version_flag: &str) -> CheckResult {
    match Command::new(command).arg(version_flag).output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!("'{}' found but {} failed", command, version_flag)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Whether speech recognition was compiled in.
pub fn whisper_enabled() -> bool {
    cfg!(feature = "whisper")
}

/// Run all dependency checks and print results.
///
/// Returns `true` when everything a dub job needs with `config` is present.
pub fn check_dependencies(config: &Config) -> bool {
    println!("Checking system dependencies...\n");
    let mut ready = true;

    print!("ffmpeg ({}): ", config.media.ffmpeg);
    match check_command(&config.media.ffmpeg, "-version") {
        CheckResult::Ok => println!("✓ OK"),
        CheckResult::NotFound => {
            ready = false;
            println!("✗ NOT FOUND");
            println!("  Install: sudo apt install ffmpeg  (Debian/Ubuntu)");
            println!("           sudo pacman -S ffmpeg    (Arch)");
        }
        CheckResult::Warning(msg) => {
            ready = false;
            println!("⚠ WARNING: {}", msg);
        }
    }

    print!("espeak-ng ({}): ", config.tts.espeak_binary);
    let espeak_needed = config.tts.backend == TtsBackend::Espeak;
    match check_command(&config.tts.espeak_binary, "--version") {
        CheckResult::Ok => println!("✓ OK"),
        CheckResult::NotFound if espeak_needed => {
            ready = false;
            println!("✗ NOT FOUND (required by tts.backend = \"espeak\")");
            println!("  Install: sudo apt install espeak-ng");
        }
        CheckResult::NotFound => println!("- not installed (only needed for --tts espeak)"),
        CheckResult::Warning(msg) => {
            if espeak_needed {
                ready = false;
            }
            println!("⚠ WARNING: {}", msg);
        }
    }

    print!("speech recognition: ");
    if whisper_enabled() {
        println!("✓ compiled in");
    } else {
        ready = false;
        println!("✗ built without the 'whisper' feature");
    }

    print!("model '{}': ", config.stt.model);
    if is_model_installed(&config.stt.model) {
        println!("✓ {}", model_path(&config.stt.model).display());
    } else {
        println!("- not installed (downloaded on first use)");
    }

    println!();
    if ready {
        println!("✓ Ready to dub.");
    } else {
        println!("⚠ Some dependencies are missing; dub jobs will fail.");
    }
    ready
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_inequality() {
        assert_ne!(CheckResult::Ok, CheckResult::NotFound);
        assert_ne!(
            CheckResult::Warning("a".to_string()),
            CheckResult::Warning("b".to_string())
        );
    }

    #[test]
    fn test_check_command_nonexistent() {
        let result = check_command("nonexistent-command-xyz-12345", "--version");
        assert_eq!(result, CheckResult::NotFound);
    }

    #[test]
    fn test_check_dependencies_reports_missing_ffmpeg() {
        let mut config = Config::default();
        config.media.ffmpeg = "nonexistent-ffmpeg-xyz-12345".to_string();
        assert!(!check_dependencies(&config));
    }
}
