//! Subcommand bodies, independent of argument parsing

use crate::input::read_spec;
use crate::output::{write_result, WriteSummary};
use scaffold_core::{
    GenerationOptions, ModelClient, Pipeline, PipelineConfig, PipelineResult, ProjectContext,
};
use scaffold_recovery::RecoveryEngine;
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// A finished `generate` run and where it was written
#[derive(Debug)]
pub struct Generated {
    pub result: PipelineResult,
    pub written: WriteSummary,
}

impl Display for Generated {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let result = &self.result;
        if result.success {
            writeln!(
                f,
                "generated {} files in {} ms (run {})",
                result.files.len(),
                result.duration_ms,
                result.run_id
            )?;
            for path in &self.written.files {
                writeln!(f, "  {}", path.display())?;
            }
            if let Some(setup) = &self.written.setup {
                writeln!(f, "setup instructions: {}", setup.display())?;
            }
        } else {
            let stage = result
                .failed_stage
                .map_or_else(|| "unknown".to_string(), |s| s.to_string());
            writeln!(f, "generation failed at stage {stage}")?;
            if let Some(error) = &result.error {
                writeln!(f, "  {error}")?;
            }
        }
        write!(f, "result: {}", self.written.result.display())
    }
}

/// Read the project spec, run the pipeline once, write the outcome under `out`
///
/// A failed run is not an `Err`: it is reported through
/// [`PipelineResult::success`] and still written.
///
/// # Errors
/// Fails only when the project spec cannot be read or the output cannot be written.
pub async fn generate<C: ModelClient>(
    client: C,
    config: PipelineConfig,
    spec: &Path,
    out: &Path,
    options: &GenerationOptions,
) -> anyhow::Result<Generated> {
    let spec = read_spec(spec)?;
    let pipeline = Pipeline::new(client).with_config(config);
    let result = pipeline.run(&spec, options).await;
    let written = write_result(&result, out).await?;
    Ok(Generated { result, written })
}

/// Serialized context for a spec file
///
/// # Errors
/// Fails when the project spec cannot be read.
pub fn context(spec: &Path) -> anyhow::Result<String> {
    let spec = read_spec(spec)?;
    Ok(ProjectContext::from_spec(&spec).render())
}

/// What the recovery engine made of one raw response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    pub text: String,
    pub applied: Vec<&'static str>,
    /// Parse error, if the repaired text is still not a JSON object
    pub error: Option<String>,
}

impl RecoveryReport {
    #[inline]
    #[must_use]
    pub fn parses(&self) -> bool {
        self.error.is_none()
    }
}

impl Display for RecoveryReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.text)?;
        writeln!(f)?;
        if self.applied.is_empty() {
            writeln!(f, "passes applied: none")?;
        } else {
            writeln!(f, "passes applied: {}", self.applied.join(", "))?;
        }
        match &self.error {
            None => write!(f, "parses: yes"),
            Some(error) => write!(f, "parses: no ({error})"),
        }
    }
}

/// Run the standard recovery passes over a raw model response
#[must_use]
pub fn recover(raw: &str) -> RecoveryReport {
    let engine = RecoveryEngine::default();
    let recovered = engine.recover(raw);
    let error = engine
        .parse::<serde_json::Map<String, serde_json::Value>>(raw)
        .err()
        .map(|e| e.to_string());
    RecoveryReport {
        text: recovered.text,
        applied: recovered.applied,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_reports_passes_and_parse() {
        let report = recover("Here you go:\n```json\n{\"files\": [1, 2,],}\n```");
        assert_eq!(report.text, "{\"files\": [1, 2]}");
        assert!(report.applied.contains(&"strip_fences"));
        assert!(report.applied.contains(&"remove_trailing_commas"));
        assert!(report.parses());
        assert!(report.to_string().ends_with("parses: yes"));
    }

    #[test]
    fn recover_reports_failure() {
        let report = recover("no json here");
        assert!(!report.parses());
        assert!(report.to_string().contains("parses: no (no structured object"));
    }

    #[test]
    fn unclosed_object_does_not_parse() {
        let report = recover("{\"a\": 1");
        assert!(!report.parses());
    }
}
