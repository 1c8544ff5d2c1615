//! Interactive dashboard session
//!
//! Every event updates the session state and reruns the whole pipeline, just
//! as the dashboard is redrawn after each interaction.

use crate::api::{MarketDataSource, YahooFinanceSource};
use crate::cache::CachedSource;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::input::{DashboardInputs, DisplayMode, NumStocks, RangeWarning, default_start_date};
use crate::narrative::NarrativeGenerator;
use crate::pipeline::{RunContext, run_pipeline, snapshot_stage};
use crate::presentation::{ChartStyle, RenderOptions, SeriesKey, StyleSelections, render_dashboard};
use crate::report::{Report, ReportBuilder};
use crate::snapshot::ChartSnapshotter;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use stockdash_llm::LLMProvider;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A user interaction
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    SetCount(NumStocks),
    SetMode(DisplayMode),
    SetRange { start: NaiveDate, end: NaiveDate },
    /// 1-based slot
    SetTicker { slot: usize, symbol: String },
    SetTickers(Vec<String>),
    SetStyle { key: SeriesKey, style: ChartStyle },
    GenerateReport,
    Refresh,
}

/// What one rerun shows
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub run_id: Uuid,
    pub rendered: String,
    pub warnings: Vec<RangeWarning>,
    pub narrative: Option<String>,
    pub report: Option<Report>,
}

/// Session state plus the collaborators every rerun uses
pub struct Dashboard {
    num_stocks: NumStocks,
    display_mode: DisplayMode,
    start_date: NaiveDate,
    end_date: NaiveDate,
    raw_tickers: Vec<String>,
    selections: StyleSelections,
    source: Arc<dyn MarketDataSource>,
    narrator: Option<NarrativeGenerator>,
    snapshotter: ChartSnapshotter,
    report_builder: ReportBuilder,
    options: RenderOptions,
    last_report: Option<Report>,
    fixed_today: Option<NaiveDate>,
}

impl Dashboard {
    /// Yahoo Finance behind the TTL cache, plus the OpenAI provider when a key is set
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let source = CachedSource::new(
            YahooFinanceSource::new(config.market_data_timeout),
            config.cache_ttl,
        );
        let snapshotter = ChartSnapshotter::new(&config.artifact_dir, config.chart_size);
        Ok(Self::with_parts(config, Arc::new(source), config.llm_provider()?, snapshotter))
    }

    pub fn with_parts(
        config: &DashboardConfig,
        source: Arc<dyn MarketDataSource>,
        provider: Option<Arc<dyn LLMProvider>>,
        snapshotter: ChartSnapshotter,
    ) -> Self {
        Self {
            num_stocks: NumStocks::default(),
            display_mode: DisplayMode::default(),
            start_date: default_start_date(),
            end_date: Local::now().date_naive(),
            raw_tickers: Vec::new(),
            selections: StyleSelections::new(),
            source,
            narrator: provider.map(|p| NarrativeGenerator::from_config(p, config)),
            snapshotter,
            report_builder: ReportBuilder::new(),
            options: RenderOptions::from_config(config),
            last_report: None,
            fixed_today: None,
        }
    }

    /// Pin "today" for range validation
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self.end_date = today;
        self
    }

    fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn can_report(&self) -> bool {
        self.narrator.is_some()
    }

    pub fn last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }

    /// Inputs as the next run will see them
    pub fn inputs(&self) -> (DashboardInputs, Vec<RangeWarning>) {
        DashboardInputs::collect(
            self.num_stocks,
            self.display_mode,
            self.start_date,
            self.end_date,
            &self.raw_tickers,
            self.today(),
        )
    }

    /// Update state without rerunning; returns whether a report was requested
    pub fn apply(&mut self, event: DashboardEvent) -> Result<bool> {
        match event {
            DashboardEvent::SetCount(n) => self.num_stocks = n,
            DashboardEvent::SetMode(mode) => self.display_mode = mode,
            DashboardEvent::SetRange { start, end } => {
                self.start_date = start;
                self.end_date = end;
            }
            DashboardEvent::SetTicker { slot, symbol } => {
                if slot == 0 || slot > self.num_stocks.get() {
                    return Err(DashboardError::InvalidInput(format!(
                        "Slot {slot} is out of range 1..={}",
                        self.num_stocks.get()
                    )));
                }
                if self.raw_tickers.len() < slot {
                    self.raw_tickers.resize(slot, String::new());
                }
                self.raw_tickers[slot - 1] = symbol;
            }
            DashboardEvent::SetTickers(symbols) => {
                // A longer list raises the count; past the maximum the extras are dropped
                if symbols.len() > self.num_stocks.get() {
                    self.num_stocks = NumStocks::clamped(symbols.len());
                }
                if symbols.len() > usize::from(NumStocks::MAX) {
                    warn!(
                        "Only the first {} of {} tickers are shown",
                        NumStocks::MAX,
                        symbols.len()
                    );
                }
                self.raw_tickers = symbols;
            }
            DashboardEvent::SetStyle { key, style } => self.selections.set(key, style),
            DashboardEvent::GenerateReport => return Ok(true),
            DashboardEvent::Refresh => {}
        }
        Ok(false)
    }

    /// Apply `event` and rerun the pipeline
    #[instrument(skip(self))]
    pub async fn handle(&mut self, event: DashboardEvent) -> Result<DashboardView> {
        let wants_report = self.apply(event)?;
        if wants_report && self.narrator.is_none() {
            return Err(DashboardError::Config(
                "OPENAI_API_KEY is not set; reports are unavailable".to_string(),
            ));
        }

        let (inputs, warnings) = self.inputs();
        let mut ctx = run_pipeline(inputs, warnings, self.source.as_ref()).await?;
        let rendered = render_dashboard(&ctx, &self.selections, &self.options);

        let (narrative, report) = if wants_report {
            let (narrative, report) = self.generate_report(&mut ctx).await?;
            (Some(narrative), Some(report))
        } else {
            (None, None)
        };

        Ok(DashboardView {
            run_id: ctx.run_id,
            rendered,
            warnings: ctx.warnings,
            narrative,
            report,
        })
    }

    async fn generate_report(&mut self, ctx: &mut RunContext) -> Result<(String, Report)> {
        let Some(narrator) = &self.narrator else {
            return Err(DashboardError::Config(
                "OPENAI_API_KEY is not set; reports are unavailable".to_string(),
            ));
        };
        if !ctx.has_data() {
            return Err(DashboardError::InvalidInput(
                "Nothing to report on: no market data was fetched".to_string(),
            ));
        }

        snapshot_stage(ctx, &self.snapshotter, &self.selections)?;
        let narrative = narrator.generate(&ctx.series).await?;
        let report = self.report_builder.build(&narrative, &ctx.artifacts)?;

        info!(file = %report.file_name, charts = ctx.artifacts.len(), "Report ready");
        self.last_report = Some(report.clone());
        Ok((narrative, report))
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("num_stocks", &self.num_stocks)
            .field("display_mode", &self.display_mode)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("raw_tickers", &self.raw_tickers)
            .field("selections", &self.selections)
            .field("can_report", &self.can_report())
            .finish_non_exhaustive()
    }
}
