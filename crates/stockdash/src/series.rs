//! Price tables and the combined close-price table

use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table, presets};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One trading day of a ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

/// Daily price table for one ticker, ordered by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Create a series; bars are sorted by date
    pub fn new(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing price per trading date
    pub fn closes(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.bars.iter().map(|bar| (bar.date, bar.close))
    }

    /// Render the table with the given comfy-table preset
    ///
    /// `max_rows` keeps only the most recent rows and notes how many were hidden.
    pub fn to_table(&self, preset: &str, max_rows: Option<usize>) -> String {
        let mut table = Table::new();
        table.load_preset(preset);
        table.set_header(vec!["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"]);

        let skip = max_rows.map_or(0, |max| self.bars.len().saturating_sub(max));
        for bar in &self.bars[skip..] {
            table.add_row(vec![
                Cell::new(bar.date.format("%Y-%m-%d")),
                Cell::new(format!("{:.6}", bar.open)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.6}", bar.high)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.6}", bar.low)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.6}", bar.close)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.6}", bar.adj_close)).set_alignment(CellAlignment::Right),
                Cell::new(bar.volume).set_alignment(CellAlignment::Right),
            ]);
        }

        let mut out = table.to_string();
        if skip > 0 {
            out.push_str(&format!(
                "\n({} earlier rows hidden, showing last {} of {})",
                skip,
                self.bars.len() - skip,
                self.bars.len()
            ));
        }
        out
    }

    /// Full table as markdown, the form sent to the narrative model
    pub fn to_prompt_table(&self) -> String {
        format!(
            "{}\n[{} rows x 6 columns]",
            self.to_table(presets::ASCII_MARKDOWN, None),
            self.bars.len()
        )
    }
}

/// One ticker's closes aligned to the combined index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedColumn {
    pub ticker: String,
    pub values: Vec<Option<f64>>,
}

/// Trading dates of the first series with one close column per ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedSeries {
    dates: Vec<NaiveDate>,
    columns: Vec<CombinedColumn>,
}

impl CombinedSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Left-align every series on the first series' dates, in order
    pub fn from_series(series: &[PriceSeries]) -> Self {
        let mut combined = Self::empty();
        for s in series {
            combined.insert(s);
        }
        combined
    }

    /// Add (or replace) a ticker's close column
    ///
    /// The first inserted series fixes the date index. A ticker already present
    /// keeps its position and has its values replaced.
    pub fn insert(&mut self, series: &PriceSeries) {
        if self.columns.is_empty() {
            self.dates = series.bars().iter().map(|bar| bar.date).collect();
        }

        let by_date: HashMap<NaiveDate, f64> = series.closes().collect();
        let values = self.dates.iter().map(|d| by_date.get(d).copied()).collect();

        match self.columns.iter_mut().find(|c| c.ticker == series.ticker()) {
            Some(column) => column.values = values,
            None => self.columns.push(CombinedColumn {
                ticker: series.ticker().to_string(),
                values,
            }),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[CombinedColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.ticker.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    /// No columns at all (the state after an invalid date range)
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A named line of a chart, aligned to `ChartData::dates`
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

impl ChartLine {
    /// Points with a value, paired with their date
    pub fn points<'a>(
        &'a self,
        dates: &'a [NaiveDate],
    ) -> impl Iterator<Item = (NaiveDate, f64)> + 'a {
        dates
            .iter()
            .zip(&self.values)
            .filter_map(|(d, v)| v.map(|v| (*d, v)))
    }
}

/// Close prices ready for drawing, shared by terminal charts and PNG snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub dates: Vec<NaiveDate>,
    pub lines: Vec<ChartLine>,
}

impl ChartData {
    pub fn from_price_series(series: &PriceSeries) -> Self {
        Self {
            dates: series.bars().iter().map(|bar| bar.date).collect(),
            lines: vec![ChartLine {
                label: series.ticker().to_string(),
                values: series.bars().iter().map(|bar| Some(bar.close)).collect(),
            }],
        }
    }

    pub fn from_combined(combined: &CombinedSeries) -> Self {
        Self {
            dates: combined.dates().to_vec(),
            lines: combined
                .columns()
                .iter()
                .map(|c| ChartLine {
                    label: c.ticker.clone(),
                    values: c.values.clone(),
                })
                .collect(),
        }
    }

    /// Smallest and largest value across all lines
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.lines
            .iter()
            .flat_map(|line| line.values.iter().flatten().copied())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.value_bounds().is_none()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Deterministic bars on consecutive weekdays starting 2024-01-02
    pub fn series(ticker: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close - 1.0,
                high: close + 2.0,
                low: close - 2.0,
                close,
                adj_close: close,
                volume: 1_000 + i as u64,
            })
            .collect();
        PriceSeries::new(ticker, bars)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::series;
    use super::*;

    #[test]
    fn test_combined_columns_follow_selection_order() {
        let aapl = series("AAPL", &[185.0, 184.0, 181.5, 181.0, 185.5]);
        let msft = series("MSFT", &[370.0, 367.0, 368.0, 367.5, 374.0]);

        let combined = CombinedSeries::from_series(&[aapl, msft]);

        assert_eq!(combined.column_names(), vec!["AAPL", "MSFT"]);
        assert_eq!(combined.row_count(), 5);
        assert_eq!(combined.columns()[1].values[4], Some(374.0));
    }

    #[test]
    fn test_combined_left_aligns_on_first_series() {
        let aapl = series("AAPL", &[1.0, 2.0, 3.0]);
        let short = series("NEWCO", &[10.0]);

        let combined = CombinedSeries::from_series(&[aapl, short]);

        assert_eq!(combined.row_count(), 3);
        assert_eq!(combined.columns()[1].values, vec![Some(10.0), None, None]);
    }

    #[test]
    fn test_combined_duplicate_ticker_keeps_one_column() {
        let first = series("AAPL", &[1.0, 2.0]);
        let again = series("AAPL", &[1.0, 2.0]);
        let msft = series("MSFT", &[5.0, 6.0]);

        let combined = CombinedSeries::from_series(&[first, msft, again]);
        assert_eq!(combined.column_names(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_empty_combined() {
        let combined = CombinedSeries::empty();
        assert!(combined.is_empty());
        assert_eq!(combined.row_count(), 0);
        assert!(ChartData::from_combined(&combined).is_empty());
    }

    #[test]
    fn test_table_truncates_to_recent_rows() {
        let s = series("AAPL", &[1.0, 2.0, 3.0, 4.0]);
        let table = s.to_table(presets::ASCII_FULL, Some(2));

        assert!(table.contains("2024-01-05"));
        assert!(!table.contains("2024-01-02"));
        assert!(table.contains("2 earlier rows hidden"));
    }

    #[test]
    fn test_prompt_table_has_every_row() {
        let s = series("MSFT", &[370.0, 371.0, 372.0]);
        let table = s.to_prompt_table();

        assert!(table.contains("Close"));
        assert!(table.contains("2024-01-02"));
        assert!(table.contains("2024-01-04"));
        assert!(table.contains("[3 rows x 6 columns]"));
    }

    #[test]
    fn test_chart_data_bounds() {
        let s = series("AAPL", &[3.0, 1.0, 2.0]);
        let chart = ChartData::from_price_series(&s);
        assert_eq!(chart.value_bounds(), Some((1.0, 3.0)));
        assert_eq!(chart.lines[0].points(&chart.dates).count(), 3);
    }
}
