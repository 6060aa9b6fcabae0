//! Naming authority
//!
//! The first pipeline stage commits to a [`NamingPlan`]: file manifest,
//! casing conventions and literal import snippets. This crate owns that
//! contract and everything derived from it.
//!
//! # Core Concepts
//!
//! - [`NamingPlan`]: the authoritative plan, with structural validation
//! - [`Bindings`]: model, service and route names derived deterministically
//!   from table and endpoint-group names
//! - [`ManifestValidator`]: a stage emits exactly its manifest files
//! - [`ImportValidator`]: cross-stage imports are byte-identical to the
//!   canonical statements
//!
//! # Example
//!
//! ```rust
//! use scaffold_naming::{singularize, CasingRule};
//!
//! let class = CasingRule::Pascal.apply(&singularize("blog_posts"));
//! assert_eq!(class, "BlogPost");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod bindings;
mod casing;
mod plan;
mod validation;

pub use bindings::{Bindings, ModelBinding, RouteBinding, ServiceBinding};
pub use casing::{normalize, singularize, CasingRule};
pub use plan::{
    FileManifest, ImportTemplates, NamingConventions, NamingPlan, PlanError, MODULE_PLACEHOLDER,
    NAME_PLACEHOLDER,
};
pub use validation::{
    import_specifier, is_import_line, mentions_identifier, require_statement, require_symbol,
    ImportValidator, ManifestValidator, ValidationError,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
