//! Pipeline orchestrator
//!
//! Drives Planner → Shared → Models → Services → Routes strictly in
//! sequence. Each stage makes exactly one model call; its recovered output
//! must parse and validate before the next stage starts. The first failure
//! ends the run, and no partial bundle is ever reported as success.

use crate::assembly;
use crate::config::{GenerationOptions, GenerationParams, PipelineConfig};
use crate::context::ProjectContext;
use crate::error::{ModelError, PipelineError, StageError, StageId};
use crate::model::{ModelClient, ModelRequest};
use crate::result::{GeneratedProject, PipelineResult, RunTrace, StageOutput};
use crate::stages::{artifact_stages, planner, StageInput};
use crate::state::PipelineState;
use crate::types::ProjectSpec;
use scaffold_artifact::ArtifactBundle;
use scaffold_recovery::RecoveryEngine;
use tracing::Instrument;

/// Sequential code-generation pipeline over a model capability
///
/// Holds no per-run state; one pipeline can serve concurrent, independent
/// runs.
#[derive(Debug)]
pub struct Pipeline<C> {
    client: C,
    config: PipelineConfig,
    recovery: RecoveryEngine,
}

impl<C: ModelClient> Pipeline<C> {
    /// Pipeline with default configuration and recovery passes
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            config: PipelineConfig::default(),
            recovery: RecoveryEngine::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_recovery(mut self, recovery: RecoveryEngine) -> Self {
        self.recovery = recovery;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run the pipeline and report the outcome
    ///
    /// Never fails: errors are folded into the returned result, tagged with
    /// the failing stage.
    pub async fn run(&self, spec: &ProjectSpec, options: &GenerationOptions) -> PipelineResult {
        let mut trace = RunTrace::new();
        let span = tracing::info_span!("pipeline", run_id = %trace.run_id, project = %spec.name);
        match self.execute(spec, options, &mut trace).instrument(span).await {
            Ok(project) => {
                tracing::info!(
                    run_id = %project.run_id,
                    files = project.file_count(),
                    "pipeline assembled"
                );
                PipelineResult::succeeded(project, trace)
            }
            Err(err) => {
                tracing::error!(
                    run_id = %trace.run_id,
                    stage = %err.stage(),
                    kind = ?err.kind(),
                    "pipeline failed: {err}"
                );
                PipelineResult::failed(&err, trace)
            }
        }
    }

    /// Run the pipeline, returning the project or the first failure
    ///
    /// # Errors
    /// [`PipelineError`] tagged with the stage that failed.
    pub async fn generate(
        &self,
        spec: &ProjectSpec,
        options: &GenerationOptions,
    ) -> Result<GeneratedProject, PipelineError> {
        let mut trace = RunTrace::new();
        let span = tracing::info_span!("pipeline", run_id = %trace.run_id, project = %spec.name);
        self.execute(spec, options, &mut trace).instrument(span).await
    }

    async fn execute(
        &self,
        spec: &ProjectSpec,
        options: &GenerationOptions,
        trace: &mut RunTrace,
    ) -> Result<GeneratedProject, PipelineError> {
        if let Err(err) = spec.validate() {
            tracing::warn!(stage = %StageId::Input, error = %err, "project spec rejected");
            return Err(err.into());
        }

        let mut state = PipelineState::Pending;
        let context = ProjectContext::from_spec(spec);
        let params = self.config.params_for(options);

        enter(&mut state, StageId::Planner)?;
        let raw = self
            .call(
                StageId::Planner,
                planner::SYSTEM.to_string(),
                planner::user_prompt(spec, &context, options),
                &params,
            )
            .await
            .map_err(|e| fail(&mut state, StageId::Planner, e))?;
        let (plan, bindings) = planner::accept(&self.recovery, &raw, spec)
            .map_err(|e| fail(&mut state, StageId::Planner, e))?;
        tracing::info!(
            stage = %StageId::Planner,
            manifest = plan.file_structure.len(),
            slug = %plan.project_slug,
            "naming plan accepted"
        );
        trace.plan = Some(plan.clone());
        trace.completed.push(StageId::Planner);

        let mut outputs: Vec<StageOutput> = Vec::new();
        for stage in artifact_stages() {
            let id = stage.id();
            enter(&mut state, id)?;
            let bundle = {
                let input = StageInput {
                    spec,
                    context: &context,
                    options,
                    plan: &plan,
                    bindings: &bindings,
                    outputs: &outputs,
                };
                let raw = self
                    .call(id, stage.system_prompt(), stage.user_prompt(&input), &params)
                    .await
                    .map_err(|e| fail(&mut state, id, e))?;
                let bundle: ArtifactBundle = self
                    .recovery
                    .parse(&raw)
                    .map_err(|e| fail(&mut state, id, e))?;
                stage
                    .accept(&input, &bundle)
                    .map_err(|e| fail(&mut state, id, e))?;
                bundle
            };
            tracing::info!(stage = %id, files = bundle.len(), "stage accepted");
            outputs.push(StageOutput { stage: id, bundle });
            trace.completed.push(id);
        }

        state
            .advance(PipelineState::Assembled)
            .map_err(|e| fail(&mut state, StageId::Routes, e))?;

        let dependencies = assembly::dependencies(spec.storage, options);
        let instructions = assembly::instructions(spec, &plan, options);
        Ok(GeneratedProject {
            run_id: trace.run_id,
            plan,
            bindings,
            outputs,
            instructions,
            dependencies,
        })
    }

    async fn call(
        &self,
        stage: StageId,
        system: String,
        prompt: String,
        params: &GenerationParams,
    ) -> Result<String, ModelError> {
        let request = ModelRequest {
            stage,
            system,
            prompt,
            params: params.clone(),
        };
        tracing::debug!(
            stage = %stage,
            system_chars = request.system.len(),
            prompt_chars = request.prompt.len(),
            "calling model"
        );
        let text = self.client.complete(&request).await?;
        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        tracing::debug!(stage = %stage, response_chars = text.len(), "model responded");
        Ok(text)
    }
}

/// Advance into the state a stage runs in
fn enter(state: &mut PipelineState, stage: StageId) -> Result<(), PipelineError> {
    let Some(next) = PipelineState::for_stage(stage) else {
        return Ok(());
    };
    let from = *state;
    state
        .advance(next)
        .map_err(|e| fail(state, stage, e))?;
    tracing::debug!(stage = %stage, ?from, to = ?next, "state transition");
    Ok(())
}

/// Mark the run failed and tag the error with its stage
fn fail(state: &mut PipelineState, stage: StageId, source: impl Into<StageError>) -> PipelineError {
    let source = source.into();
    tracing::warn!(stage = %stage, state = ?*state, error = %source, "stage failed");
    *state = PipelineState::Failed;
    PipelineError::stage_failed(stage, source)
}
