//! Writing a run to disk

use anyhow::Context;
use scaffold_core::PipelineResult;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Setup instructions, written beside the generated sources
pub const SETUP_FILE: &str = "SETUP.md";

/// Full run result as JSON
pub const RESULT_FILE: &str = "scaffold-result.json";

/// What [`write_result`] put on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Generated sources, in emission order
    pub files: Vec<PathBuf>,
    pub setup: Option<PathBuf>,
    pub result: PathBuf,
}

/// Write every artifact plus [`SETUP_FILE`] and [`RESULT_FILE`] under `root`
///
/// A failed run writes only the result JSON, so nothing partial lands next
/// to an earlier successful generation. Artifact paths are already
/// normalized relative paths and cannot leave `root`.
///
/// # Errors
/// Fails on the first directory or file that cannot be written.
pub async fn write_result(result: &PipelineResult, root: &Path) -> anyhow::Result<WriteSummary> {
    fs::create_dir_all(root)
        .await
        .with_context(|| format!("creating output directory {}", root.display()))?;

    let mut summary = WriteSummary {
        result: root.join(RESULT_FILE),
        ..WriteSummary::default()
    };

    if result.success {
        for file in &result.files {
            let target = file.path().to_path_under(root);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(&target, file.content())
                .await
                .with_context(|| format!("writing {}", target.display()))?;
            tracing::debug!(path = %file.path(), hash = %file.hash().short(), "artifact written");
            summary.files.push(target);
        }

        let setup = root.join(SETUP_FILE);
        fs::write(&setup, &result.instructions)
            .await
            .with_context(|| format!("writing {}", setup.display()))?;
        summary.setup = Some(setup);
    }

    let json = serde_json::to_string_pretty(result).context("serializing run result")?;
    fs::write(&summary.result, json)
        .await
        .with_context(|| format!("writing {}", summary.result.display()))?;

    tracing::info!(
        root = %root.display(),
        files = summary.files.len(),
        success = result.success,
        "output written"
    );
    Ok(summary)
}
