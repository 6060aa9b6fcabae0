//! Error types for the generation pipeline
//!
//! Every failure is terminal for its run and tagged with the stage it
//! happened in:
//! - Input validation, before any model call ([`StageId::Input`])
//! - Stage output that does not recover into the declared shape
//! - Model invocation failures, propagated as-is

use crate::state::TransitionError;
use crate::types::InputError;
use scaffold_naming::{PlanError, ValidationError};
use scaffold_recovery::RecoveryError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Pipeline step identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    /// Pseudo-stage for spec validation
    Input,
    Planner,
    Shared,
    Models,
    Services,
    Routes,
}

impl StageId {
    /// Stages that issue a model call, in execution order
    pub const GENERATION_ORDER: [Self; 5] = [
        Self::Planner,
        Self::Shared,
        Self::Models,
        Self::Services,
        Self::Routes,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Planner => "Planner",
            Self::Shared => "Shared",
            Self::Models => "Models",
            Self::Services => "Services",
            Self::Routes => "Routes",
        }
    }
}

impl Display for StageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The project spec was rejected
    InvalidInput,
    /// Stage output did not parse or validate after recovery
    UnrecoverableOutput,
    /// The model call itself failed
    ExternalCall,
    /// The orchestrator's own sequencing was violated
    Internal,
}

/// Failure of the model capability
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Request never got a response
    #[error("model transport error: {0}")]
    Transport(String),

    /// Service answered with an error status
    #[error("model service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Service answered without any text
    #[error("model returned no content")]
    EmptyResponse,

    /// Anything else the backing provider reports
    #[error("model provider error: {0}")]
    Provider(String),
}

/// Why one stage failed
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("output could not be recovered: {0}")]
    Recovery(#[from] RecoveryError),

    #[error("naming plan rejected: {0}")]
    Plan(#[from] PlanError),

    #[error("bundle rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("routes never mention {method} {path}")]
    MissingEndpoint { method: String, path: String },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl StageError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Model(_) => ErrorKind::ExternalCall,
            Self::Recovery(_)
            | Self::Plan(_)
            | Self::Validation(_)
            | Self::MissingEndpoint { .. } => ErrorKind::UnrecoverableOutput,
            Self::Transition(_) => ErrorKind::Internal,
        }
    }
}

/// Terminal failure of one pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid project spec: {0}")]
    InvalidInput(#[from] InputError),

    #[error("stage {stage} failed: {source}")]
    Stage {
        stage: StageId,
        #[source]
        source: StageError,
    },
}

impl PipelineError {
    /// Wrap a stage failure
    #[inline]
    #[must_use]
    pub fn stage_failed(stage: StageId, source: impl Into<StageError>) -> Self {
        Self::Stage {
            stage,
            source: source.into(),
        }
    }

    /// Stage the failure happened in
    #[inline]
    #[must_use]
    pub fn stage(&self) -> StageId {
        match self {
            Self::InvalidInput(_) => StageId::Input,
            Self::Stage { stage, .. } => *stage,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Stage { source, .. } => source.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_tagged_input() {
        let err = PipelineError::from(InputError::NoTables);
        assert_eq!(err.stage(), StageId::Input);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "invalid project spec: project declares no tables");
    }

    #[test]
    fn stage_errors_keep_identity() {
        let err = PipelineError::stage_failed(StageId::Models, RecoveryError::NoObject { len: 3 });
        assert_eq!(err.stage(), StageId::Models);
        assert_eq!(err.kind(), ErrorKind::UnrecoverableOutput);
        assert!(err.to_string().starts_with("stage Models failed: "));

        let err = PipelineError::stage_failed(StageId::Planner, ModelError::EmptyResponse);
        assert_eq!(err.kind(), ErrorKind::ExternalCall);
    }

    #[test]
    fn kinds_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::UnrecoverableOutput).unwrap(),
            "\"unrecoverable_output\""
        );
        assert_eq!(serde_json::to_string(&StageId::Models).unwrap(), "\"Models\"");
    }
}
