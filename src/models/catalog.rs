//! Whisper model metadata catalog.
//!
//! Dubbing needs a multilingual model unless the source is known to be
//! English, so the catalog marks which models can transcribe any language.

/// Base URL of the ggml model files for whisper.cpp.
const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Metadata for a Whisper model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model identifier (e.g., "tiny", "base.en", "large-v3")
    pub name: &'static str,
    /// Approximate download size in megabytes
    pub size_mb: u32,
    /// Whether the model transcribes languages other than English
    pub multilingual: bool,
}

impl ModelInfo {
    /// File name of the model on disk and on the mirror.
    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self.name)
    }

    pub fn url(&self) -> String {
        format!("{}/{}", MODEL_BASE_URL, self.file_name())
    }
}

/// Catalog of available Whisper models, smallest first.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "tiny",
        size_mb: 75,
        multilingual: true,
    },
    ModelInfo {
        name: "tiny.en",
        size_mb: 75,
        multilingual: false,
    },
    ModelInfo {
        name: "base",
        size_mb: 142,
        multilingual: true,
    },
    ModelInfo {
        name: "base.en",
        size_mb: 142,
        multilingual: false,
    },
    ModelInfo {
        name: "small",
        size_mb: 466,
        multilingual: true,
    },
    ModelInfo {
        name: "small.en",
        size_mb: 466,
        multilingual: false,
    },
    ModelInfo {
        name: "medium",
        size_mb: 1533,
        multilingual: true,
    },
    ModelInfo {
        name: "medium.en",
        size_mb: 1533,
        multilingual: false,
    },
    ModelInfo {
        name: "large-v3-turbo",
        size_mb: 1624,
        multilingual: true,
    },
    ModelInfo {
        name: "large-v3",
        size_mb: 3095,
        multilingual: true,
    },
];

/// Short names accepted in place of full model names.
const ALIASES: &[(&str, &str)] = &[("large", "large-v3"), ("turbo", "large-v3-turbo")];

/// Map an alias to its model name; other names are returned unchanged.
pub fn resolve_name(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, target)| *target)
        .unwrap_or(name)
}

/// Find a model by name or alias.
pub fn get_model(name: &str) -> Option<&'static ModelInfo> {
    let name = resolve_name(name);
    MODELS.iter().find(|m| m.name == name)
}

/// Get all available models.
pub fn list_models() -> &'static [ModelInfo] {
    MODELS
}

/// The default model: `base`, the smallest multilingual model that gives
/// usable segment timing.
pub fn default_model() -> &'static ModelInfo {
    get_model(crate::defaults::DEFAULT_MODEL).unwrap_or(&MODELS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_model_exists() {
        let model = get_model("small").unwrap();
        assert_eq!(model.name, "small");
        assert_eq!(model.size_mb, 466);
        assert!(model.multilingual);
    }

    #[test]
    fn test_get_model_not_found() {
        assert!(get_model("nonexistent").is_none());
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(resolve_name("large"), "large-v3");
        assert_eq!(resolve_name("turbo"), "large-v3-turbo");
        assert_eq!(resolve_name("base"), "base");
        assert_eq!(get_model("large").unwrap().name, "large-v3");
    }

    #[test]
    fn test_default_model_is_multilingual_base() {
        let default = default_model();
        assert_eq!(default.name, "base");
        assert!(default.multilingual);
    }

    #[test]
    fn test_url_points_at_ggml_file() {
        let model = get_model("base.en").unwrap();
        assert_eq!(model.file_name(), "ggml-base.en.bin");
        assert_eq!(
            model.url(),
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.en.bin"
        );
    }

    #[test]
    fn test_english_models_have_en_suffix() {
        for model in list_models() {
            assert_eq!(
                !model.multilingual,
                model.name.ends_with(".en"),
                "model {} has inconsistent language flag",
                model.name
            );
        }
    }

    #[test]
    fn test_model_names_are_unique() {
        let names: Vec<_> = list_models().iter().map(|m| m.name).collect();
        let mut unique_names = names.clone();
        unique_names.sort_unstable();
        unique_names.dedup();
        assert_eq!(names.len(), unique_names.len());
    }

    #[test]
    fn test_get_model_case_sensitive() {
        assert!(get_model("tiny.en").is_some());
        assert!(get_model("Tiny.en").is_none());
    }
}
