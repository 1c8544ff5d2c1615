//! Tabs and Columns layouts built from one shared panel routine

use super::{ChartStyle, RenderOptions, StyleSelections, TextChart};
use crate::input::DisplayMode;
use crate::pipeline::RunContext;
use crate::series::{ChartData, CombinedSeries, PriceSeries};
use comfy_table::{Cell, Table, presets};

/// Rendered content for one ticker slot
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// 1-based slot number
    pub slot: usize,
    pub ticker: String,
    pub content: String,
}

impl Panel {
    pub fn title(&self) -> String {
        format!("Stock {}: {}", self.slot, self.ticker)
    }
}

/// Subheader, raw table and chart for one ticker
pub fn render_panel(series: &PriceSeries, style: ChartStyle, options: &RenderOptions) -> String {
    let table = series.to_table(presets::UTF8_FULL_CONDENSED, Some(options.table_rows));
    let chart = TextChart::new(options.chart_width, options.chart_height)
        .render(&ChartData::from_price_series(series), style);

    format!(
        "Displaying data for: {}\n\n{table}\n\n{style} chart\n{chart}",
        series.ticker()
    )
}

/// One panel per fetched series, in slot order
pub fn build_panels(
    ctx: &RunContext,
    selections: &StyleSelections,
    options: &RenderOptions,
) -> Vec<Panel> {
    ctx.series
        .iter()
        .enumerate()
        .map(|(idx, series)| Panel {
            slot: idx + 1,
            ticker: series.ticker().to_string(),
            content: render_panel(series, selections.for_ticker(series.ticker()), options),
        })
        .collect()
}

/// Combined close-price section, or `None` when nothing was fetched
pub fn render_combined(
    combined: &CombinedSeries,
    style: ChartStyle,
    options: &RenderOptions,
) -> Option<String> {
    if combined.is_empty() {
        return None;
    }

    let chart = TextChart::new(options.chart_width, options.chart_height)
        .render(&ChartData::from_combined(combined), style);
    Some(format!("Combined Stock Performance\n\n{style} chart\n{chart}"))
}

fn render_tabs(panels: &[Panel]) -> String {
    let bar: Vec<String> = panels.iter().map(Panel::title).collect();
    let mut out = format!("{}\n", bar.join(" | "));

    for panel in panels {
        let title = panel.title();
        out.push_str(&format!(
            "\n── {title} {}\n{}\n",
            "─".repeat(40usize.saturating_sub(title.len())),
            panel.content
        ));
    }
    out
}

fn render_columns(panels: &[Panel]) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(panels.iter().map(Panel::title).collect::<Vec<_>>());
    table.add_row(panels.iter().map(|p| Cell::new(&p.content)).collect::<Vec<_>>());
    table.to_string()
}

/// Whole dashboard: warnings, ticker panels in the chosen layout, then the combined chart
pub fn render_dashboard(
    ctx: &RunContext,
    selections: &StyleSelections,
    options: &RenderOptions,
) -> String {
    let mut sections = Vec::new();

    if !ctx.warnings.is_empty() {
        sections.push(
            ctx.warnings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    let panels = build_panels(ctx, selections, options);
    if !panels.is_empty() {
        sections.push(match ctx.inputs.display_mode {
            DisplayMode::Tabs => render_tabs(&panels),
            DisplayMode::Columns => render_columns(&panels),
        });
    }

    if let Some(combined) = render_combined(&ctx.combined, selections.combined(), options) {
        sections.push(combined);
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DashboardInputs, NumStocks, RangeWarning};
    use crate::presentation::SeriesKey;
    use crate::series::fixtures::series;
    use chrono::NaiveDate;

    fn context(mode: DisplayMode) -> RunContext {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let (inputs, warnings) = DashboardInputs::collect(
            NumStocks::default(),
            mode,
            start,
            end,
            &["AAPL".to_string(), "MSFT".to_string()],
            end,
        );
        let mut ctx = RunContext::new(inputs, warnings);
        ctx.push_series(series("AAPL", &[185.0, 184.0, 181.5, 181.0, 185.5]));
        ctx.push_series(series("MSFT", &[370.0, 367.0, 368.0, 367.5, 374.0]));
        ctx
    }

    fn options() -> RenderOptions {
        RenderOptions {
            table_rows: 10,
            chart_width: 40,
            chart_height: 8,
        }
    }

    #[test]
    fn test_panel_content() {
        let content = render_panel(&series("AAPL", &[1.0, 2.0]), ChartStyle::Bar, &options());
        assert!(content.starts_with("Displaying data for: AAPL"));
        assert!(content.contains("Adj Close"));
        assert!(content.contains("Bar chart"));
    }

    #[test]
    fn test_tabs_show_tab_bar() {
        let rendered =
            render_dashboard(&context(DisplayMode::Tabs), &StyleSelections::new(), &options());
        assert!(rendered.contains("Stock 1: AAPL | Stock 2: MSFT"));
        assert!(rendered.contains("Combined Stock Performance"));
    }

    #[test]
    fn test_layouts_share_panel_content() {
        let mut selections = StyleSelections::new();
        selections.set(SeriesKey::ticker("MSFT"), ChartStyle::Area);

        let tabs_ctx = context(DisplayMode::Tabs);
        let columns_ctx = context(DisplayMode::Columns);
        let tabs = render_dashboard(&tabs_ctx, &selections, &options());
        let columns = render_dashboard(&columns_ctx, &selections, &options());

        let tab_panels = build_panels(&tabs_ctx, &selections, &options());
        assert_eq!(tab_panels, build_panels(&columns_ctx, &selections, &options()));

        for panel in &tab_panels {
            for line in panel.content.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
                assert!(tabs.contains(line), "tabs missing {line:?}");
                assert!(columns.contains(line), "columns missing {line:?}");
            }
        }
        assert_ne!(tabs, columns);
    }

    #[test]
    fn test_warnings_precede_dashboard() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let (inputs, warnings) = DashboardInputs::collect(
            NumStocks::default(),
            DisplayMode::Tabs,
            start,
            start,
            &[],
            start,
        );
        let ctx = RunContext::new(inputs, warnings);

        let rendered = render_dashboard(&ctx, &StyleSelections::new(), &options());
        assert_eq!(rendered, RangeWarning::EmptyRange.message());
    }
}
