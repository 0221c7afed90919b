//! Language-model providers for labassist.
//!
//! All providers implement the `labassist_core::Provider` trait. The default
//! setup talks to a local Ollama server through its OpenAI-compatible API.

pub mod builder;
pub mod openai_compat;

pub use builder::{build_from_config, default_base_url};
pub use openai_compat::OpenAiCompatProvider;
