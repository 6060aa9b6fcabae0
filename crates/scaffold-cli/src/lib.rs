//! Scaffold CLI - run the generation pipeline from the command line
//!
//! - `generate`: spec file in, project directory out
//! - `context`: print the serialized context a spec produces
//! - `recover`: show what the recovery engine makes of a raw response

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;
pub mod input;
pub mod output;
pub mod settings;

pub use commands::{context, generate, recover, Generated, RecoveryReport};
pub use input::{read_spec, SpecFormat};
pub use output::{write_result, WriteSummary, RESULT_FILE, SETUP_FILE};
pub use settings::Settings;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber: `RUST_LOG` if set, else `info`
/// (`debug` with `verbose`). Logs go to stderr so stdout stays clean.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
