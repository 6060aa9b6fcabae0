//! Structured-output recovery
//!
//! Language models asked for JSON routinely return *almost* JSON: wrapped in
//! commentary and code fences, with trailing commas, missing commas between
//! list items, or raw newlines inside string literals. This crate normalizes
//! such output before it is parsed.
//!
//! # Architecture
//!
//! ```text
//! raw text → strip_fences → extract_outermost_object → remove_trailing_commas
//!          → insert_missing_separators → escape_control_characters → serde_json
//! ```
//!
//! Each pass is total and independently testable. Recovery is best effort:
//! text that is still not valid after every pass produces a
//! [`RecoveryError`] instead of a guess.
//!
//! # Example
//!
//! ```rust
//! use scaffold_recovery::RecoveryEngine;
//!
//! let raw = "Here you go:\n```json\n{\"name\": \"blog\",}\n```";
//! let value = RecoveryEngine::default().parse_value(raw).unwrap();
//! assert_eq!(value["name"], "blog");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod engine;
pub mod error;
pub mod passes;

pub use engine::{Recovered, RecoveryEngine, RepairPass, STANDARD_PASSES};
pub use error::RecoveryError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
