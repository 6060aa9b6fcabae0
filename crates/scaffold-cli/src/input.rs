//! Project spec files

use anyhow::{bail, Context};
use scaffold_core::ProjectSpec;
use std::path::Path;

/// Serialization format of a spec file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Pick the format from the file extension
    ///
    /// # Errors
    /// Fails for anything other than `.json`, `.yaml` or `.yml`.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => bail!(
                "cannot tell the format of {}: expected a .json, .yaml or .yml file",
                path.display()
            ),
        }
    }

    /// Parse spec text in this format
    ///
    /// # Errors
    /// Fails when the text does not describe a project spec.
    pub fn parse(self, text: &str) -> anyhow::Result<ProjectSpec> {
        let spec = match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(spec)
    }
}

/// Read a spec file
///
/// # Errors
/// Fails if the file is unreadable or malformed.
pub fn read_spec(path: &Path) -> anyhow::Result<ProjectSpec> {
    let format = SpecFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading spec {}", path.display()))?;
    let spec = format
        .parse(&text)
        .with_context(|| format!("parsing spec {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        tables = spec.tables.len(),
        groups = spec.endpoints.len(),
        "spec loaded"
    );
    Ok(spec)
}
