//! Text-generation provider layer for stockdash
//!
//! This crate provides provider-agnostic abstractions for requesting a single,
//! non-streaming chat completion from a Large Language Model. It includes:
//!
//! - Message types for chat requests
//! - Completion request/response types
//! - Provider trait for LLM implementations
//! - An OpenAI-compatible provider

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
