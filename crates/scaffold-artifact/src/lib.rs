//! Scaffold artifacts
//!
//! The unit of output of the generation pipeline.
//!
//! # Core Concepts
//!
//! - [`FileArtifact`]: one generated file (path, content, optional description)
//! - [`ArtifactBundle`]: the ordered file list a single stage produced
//! - [`ArtifactPath`]: normalized relative path, safe to join onto an output dir
//! - [`ArtifactCategory`]: manifest category a file belongs to
//! - [`ContentHash`]: blake3 digest of file content
//!
//! # Example
//!
//! ```rust
//! use scaffold_artifact::{ArtifactPath, FileArtifact};
//!
//! let path = ArtifactPath::parse("./src/models/user.js").unwrap();
//! let file = FileArtifact::new(path, "class User {}");
//! assert_eq!(file.path().to_string(), "src/models/user.js");
//! assert!(file.verify());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod hash;
mod path;

pub use artifact::{ArtifactBundle, ArtifactCategory, ArtifactError, FileArtifact};
pub use hash::{ContentHash, HashError};
pub use path::{ArtifactPath, PathError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
