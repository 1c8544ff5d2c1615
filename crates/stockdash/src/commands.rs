//! Slash commands for the interactive dashboard

use crate::error::{DashboardError, Result};
use crate::input::{DisplayMode, NumStocks};
use crate::presentation::{ChartStyle, SeriesKey};
use crate::session::DashboardEvent;
use chrono::NaiveDate;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Number of tickers to compare
    Count(NumStocks),
    /// Tabs or columns
    Mode(DisplayMode),
    /// Date range to fetch
    Range { start: NaiveDate, end: NaiveDate },
    /// Replace one ticker slot (1-based)
    Ticker { slot: usize, symbol: String },
    /// Replace all ticker slots in order
    Tickers(Vec<String>),
    /// Chart style for a ticker or the combined chart
    Style { key: SeriesKey, style: ChartStyle },
    /// Generate narrative and PDF
    Report,
    /// Redraw the dashboard
    Show,
    /// Show help
    Help,
    /// Leave the dashboard
    Exit,
}

fn command_error(msg: impl Into<String>) -> DashboardError {
    DashboardError::Command(msg.into())
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| command_error(format!("Invalid date '{raw}' (expected YYYY-MM-DD): {e}")))
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(command_error("Empty input"));
        }

        let Some(body) = input.strip_prefix('/') else {
            return Err(command_error(format!(
                "Commands start with '/': try /help (got '{input}')"
            )));
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(command_error("Empty command"));
        };
        let cmd = cmd.to_lowercase();

        match cmd.as_str() {
            "count" | "n" => {
                let raw = args
                    .first()
                    .ok_or_else(|| command_error("Missing number for count command"))?;
                let n: u8 = raw
                    .parse()
                    .map_err(|_| command_error(format!("Not a number: {raw}")))?;
                Ok(Command::Count(NumStocks::new(n)?))
            }
            "mode" | "m" => {
                let raw = args.first().ok_or_else(|| {
                    command_error("Missing layout for mode command (tabs or columns)")
                })?;
                Ok(Command::Mode(raw.parse()?))
            }
            "range" | "r" => match args {
                [start, end] => Ok(Command::Range {
                    start: parse_date(start)?,
                    end: parse_date(end)?,
                }),
                _ => Err(command_error("Range requires START and END dates")),
            },
            "ticker" | "t" => match args {
                [slot, symbol] => {
                    let slot: usize = slot
                        .parse()
                        .map_err(|_| command_error(format!("Not a slot number: {slot}")))?;
                    Ok(Command::Ticker {
                        slot,
                        symbol: symbol.to_uppercase(),
                    })
                }
                _ => Err(command_error("Ticker requires SLOT and SYMBOL")),
            },
            "tickers" | "ts" => {
                if args.is_empty() {
                    return Err(command_error("Tickers requires at least one symbol"));
                }
                Ok(Command::Tickers(args.iter().map(|s| s.to_uppercase()).collect()))
            }
            "style" | "s" => match args {
                [key, style] => Ok(Command::Style {
                    key: SeriesKey::parse(key)?,
                    style: style.parse()?,
                }),
                _ => Err(command_error("Style requires KEY and line|bar|area")),
            },
            "report" | "pdf" => Ok(Command::Report),
            "show" | "refresh" => Ok(Command::Show),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(command_error(format!("Unknown command: {cmd}"))),
        }
    }

    /// Dashboard event for this command; `None` for help and exit
    pub fn into_event(self) -> Option<DashboardEvent> {
        match self {
            Command::Count(n) => Some(DashboardEvent::SetCount(n)),
            Command::Mode(mode) => Some(DashboardEvent::SetMode(mode)),
            Command::Range { start, end } => Some(DashboardEvent::SetRange { start, end }),
            Command::Ticker { slot, symbol } => Some(DashboardEvent::SetTicker { slot, symbol }),
            Command::Tickers(symbols) => Some(DashboardEvent::SetTickers(symbols)),
            Command::Style { key, style } => Some(DashboardEvent::SetStyle { key, style }),
            Command::Report => Some(DashboardEvent::GenerateReport),
            Command::Show => Some(DashboardEvent::Refresh),
            Command::Help | Command::Exit => None,
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r"
Stock Dashboard Commands
========================

Inputs:
  /count <2-10>              Number of stocks to compare
  /mode <tabs|columns>       Display mode
  /range <start> <end>       Date range, YYYY-MM-DD
  /ticker <slot> <symbol>    Set one ticker slot (1-based)
  /tickers <s1> <s2> ...     Set every ticker slot in order

Charts:
  /style <key> <line|bar|area>
                             Chart style; key is a ticker or 'combined'

Report:
  /report                    Summarize with the language model and write the PDF

Other Commands:
  /show                      Redraw the dashboard
  /help                      Show help
  /exit                      Exit

Command Aliases:
  /n = /count    /m = /mode     /r = /range    /t = /ticker
  /ts = /tickers /s = /style    /pdf = /report /q = /exit
"
    }
}
