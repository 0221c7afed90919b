//! # labassist core
//!
//! Domain types, traits, and error definitions shared by every labassist crate.
//! Nothing here talks to the network, the filesystem, or child processes;
//! those live behind the traits defined in this crate.
//!
//! - [`Provider`] abstracts the locally hosted language model.
//! - [`Tool`] and [`ToolRegistry`] form the allow-listed diagnostic surface.
//! - [`ConversationHistory`] is the per-session record of answered turns.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError};
pub use message::{ConversationHistory, Message, Role, SessionId, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, Usage};
pub use tool::{ArgumentContract, Tool, ToolRegistry, ToolRequest, ToolResult};
