//! Scaffold Core - sequential code-generation pipeline
//!
//! Turns a structured project description into a set of cross-referencing
//! source files through five dependent model calls:
//! - Planner: commits to one authoritative naming plan
//! - Shared: configuration, entry point and middleware
//! - Models: one data model per table
//! - Services: business logic over the models
//! - Routes: HTTP endpoints over the services
//!
//! Every stage's raw output goes through the recovery engine, then must
//! parse into its declared shape and pass the naming and import checks
//! before the next stage runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use scaffold_core::{GenerationOptions, Pipeline, ProjectSpec};
//!
//! # async fn example(client: impl scaffold_core::ModelClient, spec: ProjectSpec) {
//! let pipeline = Pipeline::new(client);
//! let result = pipeline.run(&spec, &GenerationOptions::default()).await;
//! if result.success {
//!     println!("generated {} files", result.files.len());
//! } else {
//!     eprintln!("{:?} failed: {:?}", result.failed_stage, result.error);
//! }
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod assembly;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod result;
pub mod state;
pub mod types;

mod stages;

pub use config::{GenerationOptions, GenerationParams, Language, PipelineConfig};
pub use context::ProjectContext;
pub use error::{ErrorKind, ModelError, PipelineError, StageError, StageId};
pub use model::{ModelClient, ModelRequest};
pub use pipeline::Pipeline;
pub use result::{GeneratedProject, PipelineResult, StageOutput};
pub use state::{PipelineState, TransitionError};
pub use types::{
    Endpoint, EndpointGroup, Field, FieldFlags, FieldType, InputError, ProjectSpec, StorageEngine,
    Table,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running the pipeline
    pub use crate::{
        GenerationOptions, ModelClient, ModelError, ModelRequest, Pipeline, PipelineConfig,
        PipelineResult, ProjectSpec, StageId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
