//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations send one chat request and wait for the whole answer.
/// There is no streaming, function calling or retrying at this layer.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with system prompt, messages and parameters
    ///
    /// # Returns
    ///
    /// The completion response with the assistant's message and metadata
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;
}
