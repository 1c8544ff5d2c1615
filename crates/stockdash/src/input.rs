//! Dashboard inputs: ticker count, layout, date range and ticker symbols

use crate::error::{DashboardError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticker used for slots the user has not filled in
pub const DEFAULT_TICKER: &str = "AAPL";

/// How per-ticker panels are arranged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    Tabs,
    Columns,
}

impl FromStr for DisplayMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tabs" | "tab" | "t" => Ok(Self::Tabs),
            "columns" | "column" | "cols" | "c" => Ok(Self::Columns),
            other => Err(DashboardError::InvalidInput(format!(
                "Unknown display mode '{other}' (expected tabs or columns)"
            ))),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tabs => f.write_str("Tabs"),
            Self::Columns => f.write_str("Columns"),
        }
    }
}

/// Number of tickers to compare, always within 2..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumStocks(u8);

impl NumStocks {
    pub const MIN: u8 = 2;
    pub const MAX: u8 = 10;

    pub fn new(n: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&n) {
            Ok(Self(n))
        } else {
            Err(DashboardError::InvalidInput(format!(
                "Number of stocks must be between {} and {}, got {n}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    /// Nearest valid count to `n`
    pub fn clamped(n: usize) -> Self {
        let n = n.clamp(usize::from(Self::MIN), usize::from(Self::MAX));
        Self(u8::try_from(n).unwrap_or(Self::MAX))
    }
}

impl Default for NumStocks {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

/// Non-fatal problems with the chosen date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeWarning {
    /// `start >= end`; nothing is fetched
    EmptyRange,
    /// `end` lies after today
    FutureEnd,
}

impl RangeWarning {
    pub fn message(self) -> &'static str {
        match self {
            Self::EmptyRange => "Error: End date must fall after start date.",
            Self::FutureEnd => "Error: We can't predict the future yet. :)",
        }
    }
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Check a date range against today
///
/// The empty-range check wins; a future end date is only reported for an
/// otherwise non-empty range.
pub fn validate_range(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Vec<RangeWarning> {
    if start >= end {
        vec![RangeWarning::EmptyRange]
    } else if end > today {
        vec![RangeWarning::FutureEnd]
    } else {
        Vec::new()
    }
}

/// Default start of the comparison window
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// Parameters for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardInputs {
    pub num_stocks: NumStocks,
    pub display_mode: DisplayMode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Exactly `num_stocks` uppercase symbols, duplicates allowed
    pub tickers: Vec<String>,
}

impl DashboardInputs {
    /// Normalize raw entries into one ticker per slot
    ///
    /// Blank or missing slots fall back to [`DEFAULT_TICKER`]; entries past
    /// `num_stocks` are ignored.
    pub fn collect(
        num_stocks: NumStocks,
        display_mode: DisplayMode,
        start_date: NaiveDate,
        end_date: NaiveDate,
        raw_tickers: &[String],
        today: NaiveDate,
    ) -> (Self, Vec<RangeWarning>) {
        let tickers = (0..num_stocks.get())
            .map(|slot| {
                raw_tickers
                    .get(slot)
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .unwrap_or(DEFAULT_TICKER)
                    .to_uppercase()
            })
            .collect();

        let warnings = validate_range(start_date, end_date, today);

        (
            Self {
                num_stocks,
                display_mode,
                start_date,
                end_date,
                tickers,
            },
            warnings,
        )
    }

    /// Fetching only happens for a non-empty range
    pub fn should_fetch(&self) -> bool {
        self.start_date < self.end_date
    }
}
