//! User message template carrying the fetched tables

use crate::error::Result;
use crate::series::PriceSeries;
use minijinja::{Environment, context};
use serde::Serialize;

/// One table per slot, numbered from 1 in selection order
pub const STOCK_DATA_TEMPLATE: &str = "This is the stock data:{% for stock in stocks %}\n\nStock {{ loop.index }} ({{ stock.ticker }}):\n{{ stock.table }}{% endfor %}";

#[derive(Debug, Serialize)]
struct StockTable<'a> {
    ticker: &'a str,
    table: String,
}

/// Render the stock-data message from every series, full tables included
pub fn stock_data_prompt(series: &[PriceSeries]) -> Result<String> {
    let stocks: Vec<StockTable<'_>> = series
        .iter()
        .map(|s| StockTable {
            ticker: s.ticker(),
            table: s.to_prompt_table(),
        })
        .collect();

    let env = Environment::new();
    Ok(env.render_str(STOCK_DATA_TEMPLATE, context! { stocks => stocks })?)
}
