//! Stock Dashboard CLI
//!
//! Renders the comparison dashboard once, or runs an interactive session.
//!
//! # Usage
//!
//! ```bash
//! # Narrative and PDF reports need a key
//! export OPENAI_API_KEY="sk-..."
//!
//! # One-shot dashboard plus report
//! cargo run --bin stockdash -- --ticker AAPL --ticker MSFT --report
//!
//! # Interactive session
//! cargo run --bin stockdash -- --interactive
//! ```

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use stockdash::commands::{Command, parse_date};
use stockdash::input::default_start_date;
use stockdash::{
    ChartStyle, Dashboard, DashboardConfig, DashboardEvent, DashboardView, DisplayMode, NumStocks,
    Report, SeriesKey,
};

#[derive(Debug, Parser)]
#[command(
    name = "stockdash",
    version,
    about = "Compare stock price histories and build PDF reports"
)]
struct Args {
    /// Number of stocks to compare (2-10)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=10))]
    count: u8,

    /// Display mode: tabs or columns
    #[arg(long, default_value = "tabs", value_parser = parse_mode)]
    mode: DisplayMode,

    /// Start date, YYYY-MM-DD (default 2024-01-01)
    #[arg(long, value_parser = parse_cli_date)]
    start: Option<NaiveDate>,

    /// End date, YYYY-MM-DD (default today)
    #[arg(long, value_parser = parse_cli_date)]
    end: Option<NaiveDate>,

    /// Ticker for the next slot; repeat for each slot
    #[arg(long = "ticker", short = 't')]
    tickers: Vec<String>,

    /// Chart style as KEY=STYLE, where KEY is a ticker or `combined`
    #[arg(long = "style", short = 's', value_parser = parse_style)]
    styles: Vec<(SeriesKey, ChartStyle)>,

    /// Generate the narrative and PDF report
    #[arg(long)]
    report: bool,

    /// Directory the PDF report is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Directory chart snapshots are written to
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Run an interactive session
    #[arg(long, short = 'i')]
    interactive: bool,
}

fn parse_mode(raw: &str) -> Result<DisplayMode, String> {
    raw.parse().map_err(|e: stockdash::DashboardError| e.to_string())
}

fn parse_cli_date(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).map_err(|e| e.to_string())
}

fn parse_style(raw: &str) -> Result<(SeriesKey, ChartStyle), String> {
    let (key, style) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=STYLE, got '{raw}'"))?;
    let key = SeriesKey::parse(key).map_err(|e| e.to_string())?;
    let style = style.parse().map_err(|e: stockdash::DashboardError| e.to_string())?;
    Ok((key, style))
}

fn print_banner(can_report: bool) {
    println!(
        r"
╔══════════════════════════════════════════════════════════════╗
║                      Stock Dashboard                         ║
║                                                              ║
║  /tickers AAPL MSFT   /range 2024-01-01 2024-06-30           ║
║  /style combined bar  /mode columns   /report   /help        ║
╚══════════════════════════════════════════════════════════════╝
"
    );
    if !can_report {
        println!("OPENAI_API_KEY is not set: /report is unavailable.\n");
    }
}

fn write_report(dir: &Path, report: &Report) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let path = dir.join(&report.file_name);
    std::fs::write(&path, &report.bytes)
        .with_context(|| format!("writing report {}", path.display()))?;
    Ok(path)
}

fn show(view: &DashboardView, output_dir: &Path) -> anyhow::Result<()> {
    println!("{}\n", view.rendered);

    if let Some(narrative) = &view.narrative {
        println!("{narrative}\n");
    }
    if let Some(report) = &view.report {
        let path = write_report(output_dir, report)?;
        println!("Report saved to {} ({})", path.display(), report.mime_type);
    }
    Ok(())
}

fn apply_args(dashboard: &mut Dashboard, args: &Args) -> anyhow::Result<()> {
    dashboard.apply(DashboardEvent::SetCount(NumStocks::new(args.count)?))?;
    dashboard.apply(DashboardEvent::SetMode(args.mode))?;

    if args.start.is_some() || args.end.is_some() {
        let (current, _) = dashboard.inputs();
        dashboard.apply(DashboardEvent::SetRange {
            start: args.start.unwrap_or_else(default_start_date),
            end: args.end.unwrap_or(current.end_date),
        })?;
    }

    if !args.tickers.is_empty() {
        dashboard.apply(DashboardEvent::SetTickers(args.tickers.clone()))?;
    }

    for (key, style) in &args.styles {
        dashboard.apply(DashboardEvent::SetStyle {
            key: key.clone(),
            style: *style,
        })?;
    }
    Ok(())
}

/// Errors are reported and the session keeps going
async fn rerun(dashboard: &mut Dashboard, event: DashboardEvent, output_dir: &Path) {
    let result = match dashboard.handle(event).await {
        Ok(view) => show(&view, output_dir),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        eprintln!("Error: {e:#}\n");
    }
}

async fn run_interactive(dashboard: &mut Dashboard, output_dir: &Path) -> anyhow::Result<()> {
    print_banner(dashboard.can_report());

    rerun(dashboard, DashboardEvent::Refresh, output_dir).await;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("stockdash> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let command = match Command::parse(input) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("Error: {e}\n");
                continue;
            }
        };

        match command {
            Command::Exit => {
                println!("Goodbye!");
                break;
            }
            Command::Help => println!("{}", Command::help_text()),
            other => {
                let Some(event) = other.into_event() else {
                    continue;
                };
                rerun(dashboard, event, output_dir).await;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockdash_utils::init_tracing();

    let args = Args::parse();

    let mut builder = DashboardConfig::builder().with_env();
    if let Some(dir) = &args.artifact_dir {
        builder = builder.artifact_dir(dir);
    }
    let config = builder.build()?;

    let mut dashboard = Dashboard::new(&config)?;
    apply_args(&mut dashboard, &args)?;

    if args.interactive {
        return run_interactive(&mut dashboard, &args.output_dir).await;
    }

    let event = if args.report {
        DashboardEvent::GenerateReport
    } else {
        DashboardEvent::Refresh
    };
    let view = dashboard.handle(event).await?;
    show(&view, &args.output_dir)
}
