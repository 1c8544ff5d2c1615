//! Comparative narrative from the text-generation provider

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::prompts::{COMPARATIVE_ANALYST, stock_data_prompt};
use crate::series::PriceSeries;
use std::sync::Arc;
use stockdash_llm::{CompletionRequest, LLMProvider, Message, StopReason};
use tracing::{info, instrument, warn};

/// Asks the model for one non-streaming comparative summary
#[derive(Clone)]
pub struct NarrativeGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl NarrativeGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 2048,
            temperature: None,
        }
    }

    /// Model, token limit and temperature from configuration
    pub fn from_config(provider: Arc<dyn LLMProvider>, config: &DashboardConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// System instruction plus one user message holding every table
    pub fn build_request(&self, series: &[PriceSeries]) -> Result<CompletionRequest> {
        let prompt = stock_data_prompt(series)?;

        Ok(CompletionRequest::builder(self.model.clone())
            .system(COMPARATIVE_ANALYST)
            .add_message(Message::user(prompt))
            .max_tokens(self.max_tokens)
            .maybe_temperature(self.temperature)
            .build())
    }

    #[instrument(
        skip(self, series),
        fields(model = %self.model, provider = self.provider.name(), tickers = series.len())
    )]
    pub async fn generate(&self, series: &[PriceSeries]) -> Result<String> {
        let request = self.build_request(series)?;
        let response = self.provider.complete(request).await?;

        if response.stop_reason == StopReason::MaxTokens {
            warn!("Narrative was cut off at the token limit");
        }

        let text = response.message.text().to_string();
        if text.trim().is_empty() {
            return Err(DashboardError::Narrative(
                "Model returned an empty narrative".to_string(),
            ));
        }

        info!(
            chars = text.len(),
            tokens = response.usage.total(),
            "Narrative generated"
        );
        Ok(text)
    }
}

impl std::fmt::Debug for NarrativeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeGenerator")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}
