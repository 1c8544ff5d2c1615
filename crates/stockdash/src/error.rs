//! Error types for dashboard operations

use thiserror::Error;

/// Dashboard specific errors
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Market data provider failed (network, unknown symbol, malformed payload)
    #[error("Market data error for {symbol}: {reason}")]
    MarketData {
        symbol: String,
        reason: String,
    },

    /// Provider answered but returned no rows for the requested range
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Market data request exceeded the configured timeout
    #[error("Market data request for {symbol} timed out after {seconds}s")]
    Timeout {
        symbol: String,
        seconds: u64,
    },

    /// Invalid value supplied through the command surface
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Text-generation provider failed
    #[error("Narrative generation failed: {0}")]
    Llm(#[from] stockdash_llm::LLMError),

    /// Response from the text-generation provider was unusable
    #[error("Narrative error: {0}")]
    Narrative(String),

    /// Prompt template rendering error
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Chart snapshot rendering error
    #[error("Chart error: {0}")]
    Chart(String),

    /// PDF assembly error
    #[error("Report error: {0}")]
    Report(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Command parsing error
    #[error("Command error: {0}")]
    Command(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
