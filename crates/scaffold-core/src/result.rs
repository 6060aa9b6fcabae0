//! Pipeline outputs

use crate::error::{ErrorKind, PipelineError, StageId};
use chrono::{DateTime, Utc};
use scaffold_artifact::{ArtifactBundle, ContentHash, FileArtifact};
use scaffold_naming::{Bindings, NamingPlan};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Bundle produced by one artifact stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: StageId,
    pub bundle: ArtifactBundle,
}

/// A fully generated project
#[derive(Debug, Clone)]
pub struct GeneratedProject {
    pub run_id: Ulid,
    pub plan: NamingPlan,
    pub bindings: Bindings,
    /// Artifact stage outputs in stage order
    pub outputs: Vec<StageOutput>,
    pub instructions: String,
    pub dependencies: Vec<String>,
}

impl GeneratedProject {
    /// Every file, stage by stage
    pub fn files(&self) -> impl Iterator<Item = &FileArtifact> {
        self.outputs.iter().flat_map(|o| o.bundle.files())
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.outputs.iter().map(|o| o.bundle.len()).sum()
    }

    /// Bundle of one stage
    #[must_use]
    pub fn output_of(&self, stage: StageId) -> Option<&ArtifactBundle> {
        self.outputs.iter().find(|o| o.stage == stage).map(|o| &o.bundle)
    }
}

/// Outcome of one run, success or not
///
/// Never a partial success: on failure `files` is empty. The plan is kept
/// whenever the planning stage got that far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: Ulid,
    pub success: bool,
    pub files: Vec<FileArtifact>,
    pub instructions: String,
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<NamingPlan>,
    pub completed_stages: Vec<StageId>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<StageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Digest over every file path and content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<ContentHash>,
}

/// What a run accumulated before it ended
#[derive(Debug)]
pub(crate) struct RunTrace {
    pub(crate) run_id: Ulid,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) plan: Option<NamingPlan>,
    pub(crate) completed: Vec<StageId>,
}

impl RunTrace {
    pub(crate) fn new() -> Self {
        Self {
            run_id: Ulid::new(),
            started_at: Utc::now(),
            plan: None,
            completed: Vec::new(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        u64::try_from(elapsed.num_milliseconds()).unwrap_or(0)
    }
}

impl PipelineResult {
    pub(crate) fn succeeded(project: GeneratedProject, trace: RunTrace) -> Self {
        let duration_ms = trace.elapsed_ms();
        let files: Vec<FileArtifact> = project.files().cloned().collect();
        let digest = ArtifactBundle::new(files.clone()).digest();
        Self {
            run_id: project.run_id,
            success: true,
            files,
            instructions: project.instructions,
            dependencies: project.dependencies,
            plan: Some(project.plan),
            completed_stages: trace.completed,
            started_at: trace.started_at,
            duration_ms,
            failed_stage: None,
            error_kind: None,
            error: None,
            digest: Some(digest),
        }
    }

    pub(crate) fn failed(error: &PipelineError, trace: RunTrace) -> Self {
        let duration_ms = trace.elapsed_ms();
        Self {
            run_id: trace.run_id,
            success: false,
            files: Vec::new(),
            instructions: String::new(),
            dependencies: Vec::new(),
            plan: trace.plan,
            completed_stages: trace.completed,
            started_at: trace.started_at,
            duration_ms,
            failed_stage: Some(error.stage()),
            error_kind: Some(error.kind()),
            error: Some(error.to_string()),
            digest: None,
        }
    }

    /// Look up a file by its path string
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&FileArtifact> {
        self.files.iter().find(|f| f.path().to_string() == path)
    }
}
