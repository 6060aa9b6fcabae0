//! Pipeline configuration and per-request generation options

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Generation parameters sent with every model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Model identifier; the client's default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

/// Pipeline-wide defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub model: Option<String>,
    /// Kept low: stages must reproduce names verbatim
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl PipelineConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Parameters for one run, request overrides applied
    #[must_use]
    pub fn params_for(&self, options: &GenerationOptions) -> GenerationParams {
        GenerationParams {
            model: options.model.clone().or_else(|| self.model.clone()),
            temperature: options.temperature.unwrap_or(self.temperature),
            top_p: self.top_p,
            max_tokens: options.max_tokens.unwrap_or(self.max_tokens),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.2,
            top_p: 0.9,
            max_tokens: 8192,
        }
    }
}

/// Source language of the generated project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(alias = "js")]
    Javascript,
    #[serde(alias = "ts")]
    Typescript,
}

impl Language {
    /// Source file extension, without the dot
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Javascript => "js",
            Self::Typescript => "ts",
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Javascript => "JavaScript",
            Self::Typescript => "TypeScript",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Options supplied with one generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Web framework package, e.g. `express`
    pub framework: String,
    pub language: Language,
    pub include_auth: bool,
    pub include_tests: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub fn with_auth(mut self, include: bool) -> Self {
        self.include_auth = include;
        self
    }

    #[must_use]
    pub fn with_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Normalized framework package name
    #[must_use]
    pub fn framework_package(&self) -> String {
        let name = self.framework.trim().to_ascii_lowercase();
        if name.is_empty() {
            DEFAULT_FRAMEWORK.to_string()
        } else {
            name
        }
    }
}

const DEFAULT_FRAMEWORK: &str = "express";

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            framework: DEFAULT_FRAMEWORK.to_string(),
            language: Language::default(),
            include_auth: false,
            include_tests: false,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }
}
