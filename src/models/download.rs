//! Model download and installation management.
//!
//! Models live in the user's cache directory. Downloads stream to a
//! `.part` file that is renamed into place only once complete, so an
//! interrupted download never leaves a truncated model behind.

use crate::error::{DubError, Result};
use crate::models::catalog::{ModelInfo, resolve_name};
use std::fs;
use std::path::PathBuf;

/// Get the directory where models are stored.
///
/// Uses `~/.cache/redub/models/` on Linux/Unix.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("redub")
        .join("models")
}

/// Get the full path for a model file.
///
/// Always returns a path regardless of whether the model is in the catalog.
pub fn model_path(name: &str) -> PathBuf {
    models_dir().join(format!("ggml-{}.bin", resolve_name(name)))
}

/// Check if a model is installed.
pub fn is_model_installed(name: &str) -> bool {
    model_path(name).exists()
}

/// List all installed model names by scanning the models directory.
pub fn list_installed_models() -> Vec<String> {
    let entries = match fs::read_dir(models_dir()) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let file_name = entry.file_name();
            let model = file_name.to_str()?.strip_prefix("ggml-")?.strip_suffix(".bin")?;
            entry.path().is_file().then(|| model.to_string())
        })
        .collect();

    names.sort();
    names
}

/// Format model information for display.
pub fn format_model_info(model: &ModelInfo) -> String {
    let status = if is_model_installed(model.name) {
        "[installed]"
    } else {
        "[not installed]"
    };
    let languages = if model.multilingual {
        "multilingual"
    } else {
        "english"
    };
    format!(
        "{:15} {:5} MB   {:12} {}",
        model.name, model.size_mb, languages, status
    )
}

/// Resolve a model to a file on disk, downloading it if allowed.
///
/// # Errors
/// Returns `DubError::TranscriptionModelNotFound` if the model is missing and
/// downloads are disabled or the model is not in the catalog.
#[cfg(feature = "model-download")]
pub async fn ensure_model(name: &str, allow_download: bool, progress: bool) -> Result<PathBuf> {
    let path = model_path(name);
    if path.exists() {
        return Ok(path);
    }
    if !allow_download {
        return Err(DubError::TranscriptionModelNotFound {
            path: path.display().to_string(),
        });
    }
    download_model(name, progress).await
}

/// Download a Whisper model from the catalog.
///
/// Returns the installed path; an already installed model is not fetched
/// again.
#[cfg(feature = "model-download")]
pub async fn download_model(name: &str, progress: bool) -> Result<PathBuf> {
    use futures_util::StreamExt;
    use indicatif::{ProgressBar, ProgressStyle};
    use tokio::io::AsyncWriteExt;

    let path = model_path(name);
    if path.exists() {
        return Ok(path);
    }

    let info = crate::models::catalog::get_model(name).ok_or_else(|| {
        DubError::TranscriptionModelNotFound {
            path: format!(
                "{} (unknown model '{}'; run 'redub models list')",
                path.display(),
                name
            ),
        }
    })?;

    let dir = models_dir();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| DubError::Other(format!("Failed to create models directory: {e}")))?;

    if progress {
        eprintln!("Downloading {} ({} MB)...", info.name, info.size_mb);
    }

    let response = reqwest::get(info.url())
        .await
        .map_err(|e| DubError::Other(format!("Failed to start download: {e}")))?;
    if !response.status().is_success() {
        return Err(DubError::Other(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let pb = if progress {
        let pb = ProgressBar::new(response.content_length().unwrap_or(0));
        pb.set_style(
            // SAFETY: hardcoded template string, always valid
            #[allow(clippy::expect_used)]
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .expect("hardcoded progress bar template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let part_path = path.with_extension("bin.part");
    let mut file = tokio::fs::File::create(&part_path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| DubError::Other(format!("Failed to read download chunk: {e}")))?;
        file.write_all(&chunk).await?;
        if let Some(ref pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }
    file.flush().await?;
    drop(file);
    tokio::fs::rename(&part_path, &path).await?;

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
        eprintln!("Model installed to: {}", path.display());
    }

    Ok(path)
}
