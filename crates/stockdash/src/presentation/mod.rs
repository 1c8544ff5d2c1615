//! Terminal rendering of ticker panels and the combined chart

pub mod layout;
pub mod text_chart;

pub use layout::{Panel, build_panels, render_combined, render_dashboard, render_panel};
pub use text_chart::TextChart;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How a series is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartStyle {
    #[default]
    Line,
    Bar,
    Area,
}

impl ChartStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Bar => "Bar",
            Self::Area => "Area",
        }
    }
}

impl FromStr for ChartStyle {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "bar" => Ok(Self::Bar),
            "area" => Ok(Self::Area),
            other => Err(DashboardError::InvalidInput(format!(
                "Unknown chart style '{other}' (expected line, bar or area)"
            ))),
        }
    }
}

impl fmt::Display for ChartStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which chart a style selection applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKey {
    Ticker(String),
    Combined,
}

impl SeriesKey {
    pub const COMBINED: &'static str = "combined";

    pub fn ticker(symbol: &str) -> Self {
        Self::Ticker(symbol.trim().to_uppercase())
    }

    /// Stable name: the ticker symbol, or `combined`
    pub fn key(&self) -> &str {
        match self {
            Self::Ticker(symbol) => symbol,
            Self::Combined => Self::COMBINED,
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DashboardError::InvalidInput(
                "Chart key must not be empty".to_string(),
            ));
        }
        if raw.eq_ignore_ascii_case(Self::COMBINED) {
            Ok(Self::Combined)
        } else {
            Ok(Self::ticker(raw))
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Chosen chart style per series; anything unset draws as a line
///
/// Selections are keyed by symbol, so two slots holding the same ticker
/// share one style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSelections {
    styles: HashMap<SeriesKey, ChartStyle>,
}

impl StyleSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: SeriesKey, style: ChartStyle) {
        self.styles.insert(key, style);
    }

    pub fn get(&self, key: &SeriesKey) -> ChartStyle {
        self.styles.get(key).copied().unwrap_or_default()
    }

    pub fn for_ticker(&self, symbol: &str) -> ChartStyle {
        self.get(&SeriesKey::ticker(symbol))
    }

    pub fn combined(&self) -> ChartStyle {
        self.get(&SeriesKey::Combined)
    }
}

/// Sizes used when rendering the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Most recent rows shown per ticker table
    pub table_rows: usize,
    /// Chart width in terminal cells, axes and legend included
    pub chart_width: usize,
    /// Chart height in terminal cells, axes and legend included
    pub chart_height: usize,
}

impl RenderOptions {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            table_rows: config.table_rows,
            chart_width: config.text_chart_size.0,
            chart_height: config.text_chart_size.1,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_style_parse() {
        assert_eq!("LINE".parse::<ChartStyle>().unwrap(), ChartStyle::Line);
        assert_eq!(" bar ".parse::<ChartStyle>().unwrap(), ChartStyle::Bar);
        assert_eq!("Area".parse::<ChartStyle>().unwrap(), ChartStyle::Area);
        assert!("pie".parse::<ChartStyle>().is_err());
    }

    #[test]
    fn test_series_key_is_stable() {
        assert_eq!(SeriesKey::parse("aapl").unwrap().key(), "AAPL");
        assert_eq!(SeriesKey::parse("Combined").unwrap(), SeriesKey::Combined);
        assert_eq!(SeriesKey::Combined.key(), "combined");
        assert!(SeriesKey::parse("  ").is_err());
    }

    #[test]
    fn test_selections_default_to_line() {
        let mut selections = StyleSelections::new();
        assert_eq!(selections.for_ticker("AAPL"), ChartStyle::Line);
        assert_eq!(selections.combined(), ChartStyle::Line);

        selections.set(SeriesKey::ticker("msft"), ChartStyle::Bar);
        selections.set(SeriesKey::Combined, ChartStyle::Area);
        assert_eq!(selections.for_ticker("MSFT"), ChartStyle::Bar);
        assert_eq!(selections.combined(), ChartStyle::Area);
        assert_eq!(selections.for_ticker("AAPL"), ChartStyle::Line);
    }
}
