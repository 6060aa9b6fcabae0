//! Scaffold LLM - HTTP model client
//!
//! Implements [`scaffold_core::ModelClient`] against any service that speaks
//! the OpenAI chat-completions protocol (OpenAI, Azure-style gateways,
//! Ollama, vLLM, llama.cpp server).

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod client;
mod types;

pub use client::{ChatClient, ClientConfig, ClientError, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
