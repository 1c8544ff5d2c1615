//! Terminal stock comparison dashboard
//!
//! This crate compares the price history of 2 to 10 tickers. It includes:
//!
//! - Input collection with date-range warnings
//! - Yahoo Finance quote history behind a TTL cache
//! - Per-ticker tables and line, bar or area charts, laid out as tabs or columns
//! - A combined close-price chart across every ticker
//! - PNG snapshots of line charts
//! - A comparative narrative from an OpenAI-compatible model
//! - A PDF report holding the narrative and the chart snapshots
//!
//! # Example
//!
//! ```rust,ignore
//! use stockdash::{Dashboard, DashboardConfig, DashboardEvent};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DashboardConfig::from_env()?;
//!     let mut dashboard = Dashboard::new(&config)?;
//!
//!     dashboard.apply(DashboardEvent::SetTickers(vec!["AAPL".into(), "MSFT".into()]))?;
//!     let view = dashboard.handle(DashboardEvent::GenerateReport).await?;
//!     println!("{}", view.rendered);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod narrative;
pub mod pipeline;
pub mod presentation;
pub mod prompts;
pub mod report;
pub mod series;
pub mod session;
pub mod snapshot;

pub use api::{MarketDataSource, YahooFinanceSource};
pub use cache::{CachedSource, FetchKey};
pub use commands::Command;
pub use config::{DashboardConfig, DashboardConfigBuilder};
pub use error::{DashboardError, Result};
pub use input::{DashboardInputs, DisplayMode, NumStocks, RangeWarning, validate_range};
pub use narrative::NarrativeGenerator;
pub use pipeline::{RunContext, run_pipeline};
pub use presentation::{ChartStyle, RenderOptions, SeriesKey, StyleSelections, render_dashboard};
pub use report::{
    Paragraph, ParagraphStyle, Report, ReportBuilder, parse_narrative, report_file_name,
};
pub use series::{CombinedSeries, PriceBar, PriceSeries};
pub use session::{Dashboard, DashboardEvent, DashboardView};
pub use snapshot::{ChartArtifact, ChartSnapshotter};
