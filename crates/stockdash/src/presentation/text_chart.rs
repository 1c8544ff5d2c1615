//! Terminal charts drawn with ratatui into an off-screen buffer

use super::ChartStyle;
use crate::series::ChartData;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
};

/// Marker, legend glyph and color per series, cycled by index
const SERIES: [(Marker, &str, Color); 4] = [
    (Marker::Braille, "⣿", Color::Cyan),
    (Marker::Dot, "•", Color::Yellow),
    (Marker::Block, "█", Color::Magenta),
    (Marker::Bar, "▄", Color::Green),
];

/// Horizontal samples per character cell when filling an area
const AREA_SAMPLES_PER_CELL: usize = 2;

/// A fixed-size chart rendered to plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChart {
    width: u16,
    height: u16,
}

/// Value range shown on the y axis; data is drawn shifted so the floor sits at 0
#[derive(Debug, Clone, Copy)]
struct YRange {
    floor: f64,
    span: f64,
}

impl YRange {
    fn new(lo: f64, hi: f64) -> Self {
        let span = hi - lo;
        if span.abs() < f64::EPSILON {
            Self {
                floor: lo - 0.5,
                span: 1.0,
            }
        } else {
            Self { floor: lo, span }
        }
    }

    fn labels(self) -> Vec<Span<'static>> {
        [0.0, 0.5, 1.0]
            .iter()
            .map(|frac| Span::raw(format!("{:.2}", self.floor + self.span * frac)))
            .collect()
    }
}

impl TextChart {
    /// Smallest area that still fits the labels, axes and legend
    pub const MIN_WIDTH: usize = 24;
    pub const MIN_HEIGHT: usize = 6;

    pub fn new(width: usize, height: usize) -> Self {
        let clamp = |value: usize, min: usize| u16::try_from(value.max(min)).unwrap_or(u16::MAX);
        Self {
            width: clamp(width, Self::MIN_WIDTH),
            height: clamp(height, Self::MIN_HEIGHT),
        }
    }

    /// Shifted `(index, value)` points for every present value of each line
    fn points(data: &ChartData, range: YRange) -> Vec<Vec<(f64, f64)>> {
        data.lines
            .iter()
            .map(|line| {
                line.values
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, v)| v.map(|v| (idx as f64, v - range.floor)))
                    .collect()
            })
            .collect()
    }

    /// Linear samples between consecutive points, dense enough to read as a filled area
    fn fill_points(points: &[(f64, f64)], samples: usize) -> Vec<(f64, f64)> {
        let mut filled = Vec::new();
        for pair in points.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            for step in 0..samples {
                let t = step as f64 / samples as f64;
                filled.push((x0 + (x1 - x0) * t, y0 + (y1 - y0) * t));
            }
        }
        filled.extend(points.last().copied());
        filled
    }

    /// Draw `data` in `style` with value labels, first/last date and a legend
    pub fn render(&self, data: &ChartData, style: ChartStyle) -> String {
        let Some((lo, hi)) = data.value_bounds() else {
            return "(no data to chart)".to_string();
        };
        let range = YRange::new(lo, hi);

        let points = Self::points(data, range);
        let x_max = data.dates.len().saturating_sub(1).max(1) as f64;
        let samples =
            (usize::from(self.width) * AREA_SAMPLES_PER_CELL / data.dates.len().max(1)).max(1);
        let plotted: Vec<Vec<(f64, f64)>> = match style {
            ChartStyle::Area => points.iter().map(|p| Self::fill_points(p, samples)).collect(),
            ChartStyle::Line | ChartStyle::Bar => points,
        };

        let graph_type = match style {
            ChartStyle::Line => GraphType::Line,
            ChartStyle::Bar | ChartStyle::Area => GraphType::Bar,
        };
        let datasets: Vec<Dataset> = data
            .lines
            .iter()
            .zip(&plotted)
            .enumerate()
            .map(|(idx, (line, pts))| {
                let (marker, _, color) = SERIES[idx % SERIES.len()];
                Dataset::default()
                    .name(line.label.clone())
                    .marker(marker)
                    .graph_type(graph_type)
                    .style(Style::default().fg(color))
                    .data(pts)
            })
            .collect();

        let date_labels: Vec<Span> = [data.dates.first(), data.dates.last()]
            .into_iter()
            .flatten()
            .map(|d| Span::raw(d.format("%Y-%m-%d").to_string()))
            .collect();

        let chart = Chart::new(datasets)
            .legend_position(None)
            .x_axis(Axis::default().bounds([0.0, x_max]).labels(date_labels))
            .y_axis(Axis::default().bounds([0.0, range.span]).labels(range.labels()));

        let area = Rect::new(0, 0, self.width, self.height);
        let [plot_area, legend_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        let mut buf = Buffer::empty(area);

        chart.render(plot_area, &mut buf);
        Paragraph::new(Self::legend(data)).render(legend_area, &mut buf);

        buffer_to_string(&buf)
    }

    fn legend(data: &ChartData) -> Line<'static> {
        let mut spans = Vec::new();
        for (idx, line) in data.lines.iter().enumerate() {
            let (_, glyph, color) = SERIES[idx % SERIES.len()];
            if idx > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(glyph, Style::default().fg(color)));
            spans.push(Span::raw(format!(" {}", line.label)));
        }
        Line::from(spans)
    }
}

/// Cell symbols row by row, trailing blanks trimmed
fn buffer_to_string(buf: &Buffer) -> String {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            let row: String = (area.left()..area.right())
                .filter_map(|x| buf.cell((x, y)).map(ratatui::buffer::Cell::symbol))
                .collect();
            row.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::fixtures::series;
    use crate::series::{ChartData, CombinedSeries};

    fn is_braille_dot(c: char) -> bool {
        ('\u{2801}'..='\u{28FF}').contains(&c)
    }

    /// Rows above the x axis, where the data is drawn
    fn plot_rows(rendered: &str) -> Vec<&str> {
        rendered.lines().take_while(|l| !l.contains('└')).collect()
    }

    /// `(row, column)` of every braille cell in the plot rows
    fn marks(rendered: &str) -> Vec<(usize, usize)> {
        plot_rows(rendered)
            .iter()
            .enumerate()
            .flat_map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .filter(|(_, c)| is_braille_dot(*c))
                    .map(move |(col, _)| (row, col))
            })
            .collect()
    }

    fn row_of(rendered: &str, label: &str) -> usize {
        plot_rows(rendered).iter().position(|l| l.contains(label)).unwrap()
    }

    #[test]
    fn test_line_chart_has_labels_and_legend() {
        let data = ChartData::from_price_series(&series("AAPL", &[100.0, 110.0, 105.0, 120.0]));
        let rendered = TextChart::new(48, 10).render(&data, ChartStyle::Line);

        assert!(rendered.contains("120.00"));
        assert!(rendered.contains("110.00"));
        assert!(rendered.contains("100.00"));
        assert!(rendered.contains("2024-01-02"));
        assert!(rendered.contains("2024-01-05"));
        assert!(rendered.lines().last().unwrap().contains("⣿ AAPL"));
        assert!(!marks(&rendered).is_empty());
        assert_eq!(rendered.lines().count(), 10);
    }

    #[test]
    fn test_bar_reaches_the_floor() {
        let data = ChartData::from_price_series(&series("AAPL", &[1.0, 2.0]));
        let chart = TextChart::new(40, 10);
        let bar = chart.render(&data, ChartStyle::Bar);
        let line = chart.render(&data, ChartStyle::Line);

        // The taller bar spans every row between the top and bottom labels
        let height = row_of(&bar, "1.00") - row_of(&bar, "2.00") + 1;
        let right_column = |rendered: &str| {
            let marks = marks(rendered);
            let col = marks.iter().map(|(_, c)| *c).max().unwrap();
            marks.iter().filter(|(_, c)| *c == col).count()
        };

        assert!(right_column(&bar) + 1 >= height);
        assert!(right_column(&line) < right_column(&bar));
    }

    #[test]
    fn test_area_fills_below_line() {
        let data = ChartData::from_price_series(&series("AAPL", &[2.0, 2.0, 1.0]));
        let chart = TextChart::new(40, 10);
        let area = marks(&chart.render(&data, ChartStyle::Area)).len();
        let line = marks(&chart.render(&data, ChartStyle::Line)).len();
        assert!(area > line * 2);
    }

    #[test]
    fn test_styles_draw_differently() {
        let data = ChartData::from_price_series(&series("AAPL", &[1.0, 3.0, 2.0, 4.0]));
        let chart = TextChart::new(40, 10);
        let line = chart.render(&data, ChartStyle::Line);
        let bar = chart.render(&data, ChartStyle::Bar);
        let area = chart.render(&data, ChartStyle::Area);
        assert_ne!(line, bar);
        assert_ne!(line, area);
        assert_ne!(bar, area);
    }

    #[test]
    fn test_combined_legend_lists_every_ticker() {
        let combined = CombinedSeries::from_series(&[
            series("AAPL", &[1.0, 2.0]),
            series("MSFT", &[3.0, 4.0]),
        ]);
        let rendered =
            TextChart::new(40, 8).render(&ChartData::from_combined(&combined), ChartStyle::Line);
        assert!(rendered.contains("⣿ AAPL  • MSFT"));
    }

    #[test]
    fn test_empty_data() {
        let data = ChartData::from_combined(&CombinedSeries::empty());
        assert_eq!(TextChart::new(40, 8).render(&data, ChartStyle::Line), "(no data to chart)");
    }

    #[test]
    fn test_flat_series_is_centered() {
        let data = ChartData::from_price_series(&series("AAPL", &[5.0, 5.0, 5.0]));
        let rendered = TextChart::new(40, 8).render(&data, ChartStyle::Line);
        assert!(rendered.contains("4.50"));
        assert!(rendered.contains("5.50"));
        assert!(!marks(&rendered).is_empty());
    }

    #[test]
    fn test_small_sizes_are_raised() {
        let data = ChartData::from_price_series(&series("AAPL", &[1.0, 2.0]));
        let rendered = TextChart::new(2, 2).render(&data, ChartStyle::Line);
        assert_eq!(rendered.lines().count(), 6);
    }

    #[test]
    fn test_fill_points_interpolates() {
        let filled = TextChart::fill_points(&[(0.0, 0.0), (1.0, 2.0)], 4);
        assert_eq!(filled, vec![(0.0, 0.0), (0.25, 0.5), (0.5, 1.0), (0.75, 1.5), (1.0, 2.0)]);
    }
}
