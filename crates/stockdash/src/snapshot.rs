//! PNG snapshots of line charts for the PDF report

use crate::error::{DashboardError, Result};
use crate::pipeline::RunContext;
use crate::presentation::{ChartStyle, StyleSelections};
use crate::series::ChartData;
use chrono::NaiveDate;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Label used for the combined chart snapshot
pub const COMBINED_LABEL: &str = "Combined";

/// A chart image written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartArtifact {
    /// Ticker symbol or `Combined`
    pub label: String,
    pub path: PathBuf,
}

/// Draws a line chart to a PNG file
pub trait ChartRenderer: Send + Sync {
    fn render_line_chart(
        &self,
        data: &ChartData,
        title: &str,
        path: &Path,
        size: (u32, u32),
    ) -> Result<()>;
}

/// Bitmap line charts drawn with plotters
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersRenderer;

impl PlottersRenderer {
    fn draw(
        data: &ChartData,
        title: &str,
        path: &Path,
        size: (u32, u32),
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (lo, hi) = data.value_bounds().ok_or("no values to chart")?;
        let first = *data.dates.first().ok_or("no dates to chart")?;
        let mut last = *data.dates.last().ok_or("no dates to chart")?;
        if last <= first {
            last = first + chrono::Duration::days(1);
        }
        let pad = ((hi - lo) * 0.05).max(0.5);

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d(first..last, (lo - pad)..(hi + pad))?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Close Price")
            .x_labels(6)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
            .draw()?;

        for (idx, line) in data.lines.iter().enumerate() {
            chart
                .draw_series(LineSeries::new(
                    line.points(&data.dates),
                    Palette99::pick(idx).stroke_width(2),
                ))?
                .label(line.label.clone())
                .legend(move |(x, y)| {
                    PathElement::new(
                        vec![(x, y), (x + 20, y)],
                        Palette99::pick(idx).stroke_width(2),
                    )
                });
        }

        if data.lines.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render_line_chart(
        &self,
        data: &ChartData,
        title: &str,
        path: &Path,
        size: (u32, u32),
    ) -> Result<()> {
        Self::draw(data, title, path, size).map_err(|e| DashboardError::Chart(e.to_string()))
    }
}

/// Writes run-scoped chart snapshots into one directory
#[derive(Clone)]
pub struct ChartSnapshotter {
    dir: PathBuf,
    size: (u32, u32),
    renderer: Arc<dyn ChartRenderer>,
}

impl ChartSnapshotter {
    pub fn new(dir: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self::with_renderer(dir, size, Arc::new(PlottersRenderer))
    }

    pub fn with_renderer(
        dir: impl Into<PathBuf>,
        size: (u32, u32),
        renderer: Arc<dyn ChartRenderer>,
    ) -> Self {
        Self {
            dir: dir.into(),
            size,
            renderer,
        }
    }

    /// `chart_<run-uuid>_<sequence>.png`
    pub fn file_name(run_id: Uuid, sequence: usize) -> String {
        format!("chart_{run_id}_{sequence}.png")
    }

    /// Render one line chart titled `"{label} - Line Chart"`
    pub fn snapshot(
        &self,
        data: &ChartData,
        label: &str,
        run_id: Uuid,
        sequence: usize,
    ) -> Result<ChartArtifact> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::file_name(run_id, sequence));
        let title = format!("{label} - Line Chart");

        self.renderer.render_line_chart(data, &title, &path, self.size)?;
        debug!(label, path = %path.display(), "Wrote chart snapshot");

        Ok(ChartArtifact {
            label: label.to_string(),
            path,
        })
    }

    /// Snapshot every ticker drawn as a line, then the combined chart if it is one
    pub fn snapshot_line_charts(
        &self,
        ctx: &RunContext,
        selections: &StyleSelections,
    ) -> Result<Vec<ChartArtifact>> {
        let mut artifacts = Vec::new();

        for series in &ctx.series {
            if selections.for_ticker(series.ticker()) == ChartStyle::Line {
                let data = ChartData::from_price_series(series);
                artifacts.push(self.snapshot(&data, series.ticker(), ctx.run_id, artifacts.len())?);
            }
        }

        if !ctx.combined.is_empty() && selections.combined() == ChartStyle::Line {
            let data = ChartData::from_combined(&ctx.combined);
            artifacts.push(self.snapshot(&data, COMBINED_LABEL, ctx.run_id, artifacts.len())?);
        }

        info!(count = artifacts.len(), "Chart snapshots ready");
        Ok(artifacts)
    }
}

impl std::fmt::Debug for ChartSnapshotter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSnapshotter")
            .field("dir", &self.dir)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
