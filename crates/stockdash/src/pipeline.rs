//! One dashboard run: collect, fetch, combine, and optionally snapshot

use crate::api::MarketDataSource;
use crate::error::Result;
use crate::input::{DashboardInputs, RangeWarning};
use crate::presentation::StyleSelections;
use crate::series::{CombinedSeries, PriceSeries};
use crate::snapshot::{ChartArtifact, ChartSnapshotter};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Everything one run produces, threaded through every stage
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub inputs: DashboardInputs,
    pub warnings: Vec<RangeWarning>,
    /// One series per ticker slot, in slot order
    pub series: Vec<PriceSeries>,
    pub combined: CombinedSeries,
    /// Snapshots in creation order (report runs only)
    pub artifacts: Vec<ChartArtifact>,
}

impl RunContext {
    pub fn new(inputs: DashboardInputs, warnings: Vec<RangeWarning>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            inputs,
            warnings,
            series: Vec::new(),
            combined: CombinedSeries::empty(),
            artifacts: Vec::new(),
        }
    }

    /// Record a fetched series and fold its closes into the combined table
    pub fn push_series(&mut self, series: PriceSeries) {
        self.combined.insert(&series);
        self.series.push(series);
    }

    pub fn has_data(&self) -> bool {
        !self.series.is_empty()
    }
}

/// Fetch every slot sequentially; the first failure aborts the run
#[instrument(skip_all, fields(run_id = %ctx.run_id, tickers = ctx.inputs.tickers.len()))]
pub async fn fetch_stage(ctx: &mut RunContext, source: &dyn MarketDataSource) -> Result<()> {
    for warning in &ctx.warnings {
        warn!("{warning}");
    }

    if !ctx.inputs.should_fetch() {
        info!("Empty date range, skipping fetch");
        return Ok(());
    }

    let (start, end) = (ctx.inputs.start_date, ctx.inputs.end_date);
    for ticker in ctx.inputs.tickers.clone() {
        let series = source.fetch_history(&ticker, start, end).await?;
        ctx.push_series(series);
    }

    info!(
        columns = ctx.combined.columns().len(),
        rows = ctx.combined.row_count(),
        "Fetched market data"
    );
    Ok(())
}

/// Write line-chart snapshots for the current styles into the context
pub fn snapshot_stage(
    ctx: &mut RunContext,
    snapshotter: &ChartSnapshotter,
    selections: &StyleSelections,
) -> Result<()> {
    ctx.artifacts = snapshotter.snapshot_line_charts(ctx, selections)?;
    Ok(())
}

/// Build a run context from inputs and fetch its data
pub async fn run_pipeline(
    inputs: DashboardInputs,
    warnings: Vec<RangeWarning>,
    source: &dyn MarketDataSource,
) -> Result<RunContext> {
    let mut ctx = RunContext::new(inputs, warnings);
    fetch_stage(&mut ctx, source).await?;
    Ok(ctx)
}
