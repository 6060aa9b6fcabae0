//! Tool settings: TOML file, then environment
//!
//! ```toml
//! [model]
//! base_url = "http://localhost:11434/v1"
//! model = "qwen2.5-coder"
//!
//! [generation]
//! temperature = 0.1
//! max_tokens = 4096
//!
//! [options]
//! framework = "express"
//! language = "typescript"
//! include_auth = true
//! ```

use anyhow::Context;
use scaffold_core::{GenerationOptions, PipelineConfig};
use scaffold_llm::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_API_KEY: &str = "SCAFFOLD_API_KEY";
pub const ENV_BASE_URL: &str = "SCAFFOLD_BASE_URL";
pub const ENV_MODEL: &str = "SCAFFOLD_MODEL";

/// Everything the `generate` command needs besides the project spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Where and how to reach the model service
    pub model: ClientConfig,
    /// Sampling defaults for every stage
    pub generation: PipelineConfig,
    /// Default request options; command-line flags override them
    pub options: GenerationOptions,
}

impl Settings {
    /// Read a settings file
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not valid settings TOML.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing settings {}", path.display()))
    }

    /// Parse settings TOML
    ///
    /// # Errors
    /// Fails on malformed TOML or unknown tables.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Settings file if given, defaults otherwise, then the process environment
    ///
    /// # Errors
    /// Propagates [`Settings::from_file`] failures.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(settings.with_env(|key| std::env::var(key).ok()))
    }

    /// Overlay non-empty environment values onto the model section
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = var(ENV_API_KEY) {
            self.model.api_key = Some(key);
        }
        if let Some(url) = var(ENV_BASE_URL) {
            self.model.base_url = url;
        }
        if let Some(model) = var(ENV_MODEL) {
            self.model.model = model;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaffold_core::Language;
    use std::collections::HashMap;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn reads_every_table() {
        let settings = Settings::from_toml(
            r#"
            [model]
            base_url = "http://localhost:11434/v1"
            model = "qwen2.5-coder"
            timeout_secs = 300

            [generation]
            temperature = 0.1
            max_tokens = 4096

            [options]
            language = "ts"
            include_auth = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.base_url, "http://localhost:11434/v1");
        assert_eq!(settings.model.model, "qwen2.5-coder");
        assert_eq!(settings.model.timeout_secs, Some(300));
        assert_eq!(settings.generation.max_tokens, 4096);
        assert!((settings.generation.top_p - 0.9).abs() < f32::EPSILON);
        assert_eq!(settings.options.language, Language::Typescript);
        assert!(settings.options.include_auth);
        assert_eq!(settings.options.framework, "express");
    }

    #[test]
    fn unknown_table_is_rejected() {
        assert!(Settings::from_toml("[modle]\nmodel = \"x\"\n").is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "sk-env"),
            (ENV_BASE_URL, "http://127.0.0.1:8000/v1"),
            (ENV_MODEL, ""),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_toml("[model]\nmodel = \"from-file\"\n")
            .unwrap()
            .with_env(|key| env.get(key).map(ToString::to_string));

        assert_eq!(settings.model.api_key.as_deref(), Some("sk-env"));
        assert_eq!(settings.model.base_url, "http://127.0.0.1:8000/v1");
        assert_eq!(settings.model.model, "from-file");
    }
}
