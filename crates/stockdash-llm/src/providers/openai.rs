//! OpenAI provider implementation
//!
//! This module implements the LLMProvider trait for OpenAI's chat completions
//! endpoint. See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Examples
//!
//! ```no_run
//! use stockdash_llm::{CompletionRequest, Message, LLMProvider};
//! use stockdash_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAIProvider::with_config(OpenAIConfig::new("sk-..."))?;
//!
//!     let request = CompletionRequest::builder("gpt-3.5-turbo")
//!         .system("You are a financial assistant.")
//!         .add_message(Message::user("Summarize AAPL vs MSFT."))
//!         .max_tokens(512)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Using with OpenAI-compatible APIs
//!
//! ```no_run
//! use stockdash_llm::providers::{OpenAIProvider, OpenAIConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // For local LLM deployments (e.g., llama.cpp, vLLM, LM Studio)
//! let local_config = OpenAIConfig::new("not-needed")
//!     .with_api_base("http://localhost:1234/v1");
//!
//! let provider = OpenAIProvider::with_config(local_config)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, Role,
    StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the OpenAI API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI provider
///
/// Works with gpt-3.5-turbo, gpt-4o and any OpenAI-compatible server.
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(
        skip(self, request),
        fields(model = %request.model, api_base = %self.config.api_base)
    )]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to OpenAI API at {}", self.config.api_base);

        let openai_request = build_openai_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(openai_request.model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        parse_openai_response(openai_response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// OpenAI-specific wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Build the wire request; the system prompt becomes the first message.
fn build_openai_request(request: CompletionRequest) -> OpenAIRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);

    if let Some(system) = request.system {
        messages.push(OpenAIMessage {
            role: Role::System.as_str(),
            content: system,
        });
    }

    messages.extend(request.messages.into_iter().map(|msg| OpenAIMessage {
        role: msg.role.as_str(),
        content: msg.content,
    }));

    OpenAIRequest {
        model: request.model,
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

/// Take the first choice; a missing choice or content field is an error.
fn parse_openai_response(response: OpenAIResponse) -> Result<CompletionResponse> {
    let usage = response.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

    let finish_reason = choice.finish_reason.unwrap_or_default();
    debug!(
        "Received response - stop_reason: {}, tokens: {}/{}",
        finish_reason, usage.input_tokens, usage.output_tokens
    );

    let content = choice.message.content.ok_or_else(|| {
        LLMError::UnexpectedResponse("Response message has no content".to_string())
    })?;

    Ok(CompletionResponse {
        message: Message::assistant(content),
        stop_reason: map_stop_reason(&finish_reason),
        usage,
    })
}

/// Map OpenAI stop reason to our format
fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::ContentFilter,
        _ => {
            debug!("Unknown stop reason: {}", reason);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
