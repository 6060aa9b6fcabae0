//! The text-generation capability
//!
//! The pipeline depends on one operation only: given instruction text,
//! context text and generation parameters, return text. Any provider that
//! can do that plugs in through [`ModelClient`].

use crate::config::GenerationParams;
use crate::error::{ModelError, StageId};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// One model invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    /// Stage issuing the call
    pub stage: StageId,
    /// Fixed instruction text for the stage
    pub system: String,
    /// Context built from the plan, the project spec and prior stages
    pub prompt: String,
    pub params: GenerationParams,
}

/// Text completion capability
///
/// Called exactly once per stage. Implementations should not retry on the
/// pipeline's behalf: a failed call is final for the run.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Complete a request into a single text blob
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError>;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for Arc<T> {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError> {
        (**self).complete(request).await
    }
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for Box<T> {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError> {
        (**self).complete(request).await
    }
}
