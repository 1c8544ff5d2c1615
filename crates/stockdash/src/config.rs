//! Configuration for dashboard operations

use crate::error::{DashboardError, Result};
use crate::presentation::TextChart;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stockdash_llm::LLMProvider;
use stockdash_llm::providers::{OpenAIConfig, OpenAIProvider};

/// Default text-generation model (the one the dashboard was tuned against)
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Configuration for the dashboard pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Chat model used for the comparative narrative
    pub model: String,

    /// Maximum tokens the narrative may use
    pub max_tokens: usize,

    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,

    /// Text-generation credential (`OPENAI_API_KEY`)
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Override for OpenAI-compatible servers (`OPENAI_API_BASE`)
    pub openai_api_base: Option<String>,

    /// Request timeout for the narrative call
    pub llm_timeout: Duration,

    /// Request timeout for each market data fetch
    pub market_data_timeout: Duration,

    /// How long fetched price tables stay cached; zero disables caching
    pub cache_ttl: Duration,

    /// Directory chart snapshots are written to (never cleaned up)
    pub artifact_dir: PathBuf,

    /// Pixel size of chart snapshots
    pub chart_size: (u32, u32),

    /// Most recent rows shown per ticker table in the terminal
    pub table_rows: usize,

    /// Character size of terminal charts (columns, rows)
    pub text_chart_size: (usize, usize),
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
            temperature: None,
            openai_api_key: None,
            openai_api_base: None,
            llm_timeout: Duration::from_secs(120),
            market_data_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300), // 5 minutes
            artifact_dir: std::env::temp_dir().join("stockdash"),
            chart_size: (800, 600),
            table_rows: 15,
            text_chart_size: (72, 16),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Load the OpenAI key, base URL and model from the environment
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(DashboardError::Config("model must not be empty".to_string()));
        }

        if self.max_tokens == 0 {
            return Err(DashboardError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.chart_size.0 == 0 || self.chart_size.1 == 0 {
            return Err(DashboardError::Config(
                "chart_size must be non-zero in both dimensions".to_string(),
            ));
        }

        if self.table_rows == 0 {
            return Err(DashboardError::Config(
                "table_rows must be greater than 0".to_string(),
            ));
        }

        if self.text_chart_size.0 < TextChart::MIN_WIDTH
            || self.text_chart_size.1 < TextChart::MIN_HEIGHT
        {
            return Err(DashboardError::Config(format!(
                "text_chart_size must be at least {}x{}",
                TextChart::MIN_WIDTH,
                TextChart::MIN_HEIGHT
            )));
        }

        Ok(())
    }

    /// Whether the narrative/report step can run
    pub fn has_llm_credentials(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Build the text-generation provider, if a credential is configured
    pub fn llm_provider(&self) -> Result<Option<Arc<dyn LLMProvider>>> {
        let Some(api_key) = &self.openai_api_key else {
            return Ok(None);
        };

        let mut config =
            OpenAIConfig::new(api_key.clone()).with_timeout(self.llm_timeout.as_secs());
        if let Some(base) = &self.openai_api_base {
            config = config.with_api_base(base.clone());
        }

        let provider: Arc<dyn LLMProvider> = Arc::new(OpenAIProvider::with_config(config)?);
        Ok(Some(provider))
    }
}

/// Builder for DashboardConfig
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    openai_api_key: Option<String>,
    openai_api_base: Option<String>,
    llm_timeout: Option<Duration>,
    market_data_timeout: Option<Duration>,
    cache_ttl: Option<Duration>,
    artifact_dir: Option<PathBuf>,
    chart_size: Option<(u32, u32)>,
    table_rows: Option<usize>,
    text_chart_size: Option<(usize, usize)>,
}

impl DashboardConfigBuilder {
    /// Set the chat model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the narrative token limit
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the OpenAI API key
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the OpenAI-compatible base URL
    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.openai_api_base = Some(base.into());
        self
    }

    /// Set the narrative request timeout
    pub fn llm_timeout(mut self, duration: Duration) -> Self {
        self.llm_timeout = Some(duration);
        self
    }

    /// Set the per-ticker market data timeout
    pub fn market_data_timeout(mut self, duration: Duration) -> Self {
        self.market_data_timeout = Some(duration);
        self
    }

    /// Set the price table cache TTL
    pub fn cache_ttl(mut self, duration: Duration) -> Self {
        self.cache_ttl = Some(duration);
        self
    }

    /// Set the chart snapshot directory
    pub fn artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Set the chart snapshot pixel size
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = Some((width, height));
        self
    }

    /// Set how many table rows the terminal shows
    pub fn table_rows(mut self, rows: usize) -> Self {
        self.table_rows = Some(rows);
        self
    }

    /// Set the terminal chart size
    pub fn text_chart_size(mut self, columns: usize, rows: usize) -> Self {
        self.text_chart_size = Some((columns, rows));
        self
    }

    /// Load `OPENAI_API_KEY`, `OPENAI_API_BASE` and `OPENAI_MODEL`
    ///
    /// Values already set on the builder win over the environment.
    pub fn with_env(mut self) -> Self {
        if self.openai_api_key.is_none() {
            self.openai_api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }
        if self.openai_api_base.is_none() {
            self.openai_api_base = std::env::var("OPENAI_API_BASE").ok().filter(|b| !b.is_empty());
        }
        if self.model.is_none() {
            self.model = std::env::var("OPENAI_MODEL").ok().filter(|m| !m.is_empty());
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let defaults = DashboardConfig::default();

        let config = DashboardConfig {
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            openai_api_key: self.openai_api_key,
            openai_api_base: self.openai_api_base,
            llm_timeout: self.llm_timeout.unwrap_or(defaults.llm_timeout),
            market_data_timeout: self
                .market_data_timeout
                .unwrap_or(defaults.market_data_timeout),
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
            artifact_dir: self.artifact_dir.unwrap_or(defaults.artifact_dir),
            chart_size: self.chart_size.unwrap_or(defaults.chart_size),
            table_rows: self.table_rows.unwrap_or(defaults.table_rows),
            text_chart_size: self.text_chart_size.unwrap_or(defaults.text_chart_size),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.chart_size, (800, 600));
        assert!(!config.has_llm_credentials());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = DashboardConfig::builder()
            .model("gpt-4o")
            .max_tokens(512)
            .openai_api_key("sk-test")
            .cache_ttl(Duration::ZERO)
            .artifact_dir("/tmp/charts")
            .build()
            .unwrap();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.cache_ttl, Duration::ZERO);
        assert_eq!(config.artifact_dir, PathBuf::from("/tmp/charts"));
        assert!(config.has_llm_credentials());
    }

    #[test]
    fn test_validation_rejects_zero_tokens() {
        let result = DashboardConfig::builder().max_tokens(0).build();
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_tiny_text_chart() {
        let config = DashboardConfig {
            text_chart_size: (20, 4),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_llm_provider_requires_key() {
        let config = DashboardConfig::default();
        assert!(config.llm_provider().unwrap().is_none());

        let config = DashboardConfig::builder()
            .openai_api_key("sk-test")
            .openai_api_base("http://localhost:1234/v1")
            .build()
            .unwrap();
        let provider = config.llm_provider().unwrap().unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = DashboardConfig::builder()
            .openai_api_key("sk-secret")
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
