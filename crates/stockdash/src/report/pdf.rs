//! Letter-size PDF assembly with printpdf

use super::markup::{Paragraph, ParagraphStyle, parse_narrative};
use crate::error::{DashboardError, Result};
use crate::snapshot::ChartArtifact;
use chrono::{Local, NaiveDateTime};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};
use tracing::{debug, info};

pub const REPORT_TITLE: &str = "Stock Market Analysis Tool";
pub const REPORT_MIME_TYPE: &str = "application/pdf";

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const FRAME_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const SPACER: f32 = 12.0;
const IMAGE_WIDTH: f32 = 400.0;
const IMAGE_HEIGHT: f32 = 300.0;

// Helvetica advance widths (1/1000 em) for ' '..='~'
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722, 722, 667,
    611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667,
    667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500,
    222, 833, 556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, 975, 722, 722, 722, 722, 667,
    611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667,
    667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556,
    278, 889, 611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// `stock_analysis_report_<YYYYMMDDHHMMSS>.pdf`
pub fn report_file_name(timestamp: NaiveDateTime) -> String {
    format!("stock_analysis_report_{}.pdf", timestamp.format("%Y%m%d%H%M%S"))
}

/// A finished report held in memory
#[derive(Debug, Clone)]
pub struct Report {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    pub created_at: NaiveDateTime,
}

/// Approximate rendered width of `text` in points
fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    let units: u32 = text
        .chars()
        .map(|c| match c {
            ' '..='~' => u32::from(table[c as usize - 32]),
            '•' => 350,
            _ => 556,
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap; words wider than the line are split by character
fn wrap(text: &str, max_width: f32, size: f32, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if text_width(&candidate, size, bold) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        for c in word.chars() {
            current.push(c);
            if text_width(&current, size, bold) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::replace(&mut current, c.to_string()));
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Something drawn at a fixed position; `y` is the baseline (text) or bottom edge (image)
#[derive(Debug, Clone, PartialEq)]
enum Placement {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
    },
    Image {
        index: usize,
        x: f32,
        y: f32,
    },
}

struct Flow {
    pages: Vec<Vec<Placement>>,
    y: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN && self.y < PAGE_HEIGHT - MARGIN {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn push(&mut self, placement: Placement) {
        if let Some(page) = self.pages.last_mut() {
            page.push(placement);
        }
    }

    fn space(&mut self, height: f32) {
        self.y -= height;
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        let style = paragraph.style;
        let (size, bold, indent) = (style.font_size(), style.bold(), style.left_indent());

        self.space(style.space_before());
        for line in wrap(&paragraph.display_text(), FRAME_WIDTH - indent, size, bold) {
            self.ensure(style.leading());
            self.y -= style.leading();
            if line.is_empty() {
                continue;
            }
            let x = if style.centered() {
                MARGIN + ((FRAME_WIDTH - text_width(&line, size, bold)) / 2.0).max(0.0)
            } else {
                MARGIN + indent
            };
            let y = self.y;
            self.push(Placement::Text {
                text: line,
                x,
                y,
                size,
                bold,
            });
        }
        self.space(style.space_after());
    }

    fn image(&mut self, index: usize) {
        self.ensure(IMAGE_HEIGHT);
        self.y -= IMAGE_HEIGHT;
        let y = self.y;
        self.push(Placement::Image { index, x: MARGIN, y });
    }
}

/// Title, spacer, narrative, spacer, then each image followed by a spacer
fn layout(paragraphs: &[Paragraph], image_count: usize) -> Vec<Vec<Placement>> {
    let mut flow = Flow::new();

    flow.paragraph(&Paragraph::new(ParagraphStyle::Title, REPORT_TITLE));
    flow.space(SPACER);
    for paragraph in paragraphs {
        flow.paragraph(paragraph);
    }
    flow.space(SPACER);
    for index in 0..image_count {
        flow.image(index);
        flow.space(SPACER);
    }

    flow.pages
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn pdf_error(e: impl std::fmt::Debug) -> DashboardError {
    DashboardError::Report(format!("{e:?}"))
}

/// Builds the analysis PDF from a narrative and chart snapshots
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, narrative: &str, artifacts: &[ChartArtifact]) -> Result<Report> {
        self.build_at(narrative, artifacts, Local::now().naive_local())
    }

    /// Build with an explicit creation time (used for the file name)
    pub fn build_at(
        &self,
        narrative: &str,
        artifacts: &[ChartArtifact],
        created_at: NaiveDateTime,
    ) -> Result<Report> {
        let paragraphs = parse_narrative(narrative);

        let images = artifacts
            .iter()
            .map(|artifact| {
                let decoded = image::open(&artifact.path).map_err(|e| {
                    DashboardError::Report(format!(
                        "Cannot read chart {}: {e}",
                        artifact.path.display()
                    ))
                })?;
                let rgb = decoded.to_rgb8();
                let dimensions = rgb.dimensions();
                Ok((image::DynamicImage::ImageRgb8(rgb), dimensions))
            })
            .collect::<Result<Vec<_>>>()?;

        let pages = layout(&paragraphs, images.len());
        debug!(paragraphs = paragraphs.len(), pages = pages.len(), "Laid out report");

        let (doc, first_page, first_layer) =
            PdfDocument::new(REPORT_TITLE, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

        for (page_idx, placements) in pages.iter().enumerate() {
            let layer = if page_idx == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
                doc.get_page(page).get_layer(layer)
            };
            draw_page(&layer, placements, &images, &regular, &bold);
        }

        let bytes = doc.save_to_bytes().map_err(pdf_error)?;
        info!(bytes = bytes.len(), charts = images.len(), "Report built");

        Ok(Report {
            file_name: report_file_name(created_at),
            mime_type: REPORT_MIME_TYPE,
            bytes,
            created_at,
        })
    }
}

fn draw_page(
    layer: &PdfLayerReference,
    placements: &[Placement],
    images: &[(image::DynamicImage, (u32, u32))],
    regular: &IndirectFontRef,
    bold_font: &IndirectFontRef,
) {
    for placement in placements {
        match placement {
            Placement::Text {
                text,
                x,
                y,
                size,
                bold,
            } => {
                let font = if *bold { bold_font } else { regular };
                layer.use_text(text.as_str(), *size, mm(*x), mm(*y), font);
            }
            Placement::Image { index, x, y } => {
                let Some((source, (px_w, px_h))) = images.get(*index) else {
                    continue;
                };
                Image::from_dynamic_image(source).add_to_layer(
                    layer.clone(),
                    ImageTransform {
                        translate_x: Some(mm(*x)),
                        translate_y: Some(mm(*y)),
                        dpi: Some(72.0),
                        scale_x: Some(IMAGE_WIDTH / (*px_w).max(1) as f32),
                        scale_y: Some(IMAGE_HEIGHT / (*px_h).max(1) as f32),
                        ..Default::default()
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap()
    }

    #[test]
    fn test_report_file_name() {
        let name = report_file_name(timestamp());
        assert_eq!(name, "stock_analysis_report_20240701090503.pdf");

        let digits = name
            .strip_prefix("stock_analysis_report_")
            .and_then(|rest| rest.strip_suffix(".pdf"))
            .unwrap();
        assert_eq!(digits.len(), 14);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "Apple outperformed Microsoft over the period with steady gains ".repeat(6);
        let lines = wrap(&text, 200.0, 12.0, false);

        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, 12.0, false) <= 200.0));
        assert_eq!(lines.join(" ").split_whitespace().count(), text.split_whitespace().count());
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap(&"X".repeat(200), 100.0, 12.0, true);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, 12.0, true) <= 100.0));
    }

    #[test]
    fn test_wrap_empty_line() {
        assert_eq!(wrap("", 100.0, 12.0, false), vec![String::new()]);
    }

    #[test]
    fn test_layout_starts_with_centered_title() {
        let pages = layout(&parse_narrative("### Summary\nBody"), 0);
        let Placement::Text { text, x, bold, .. } = &pages[0][0] else {
            panic!("expected title text");
        };
        assert_eq!(text, REPORT_TITLE);
        assert!(*bold);
        assert!(*x > MARGIN);
    }

    #[test]
    fn test_long_narrative_breaks_pages() {
        let narrative = "- A point worth making about relative returns\n".repeat(80);
        let pages = layout(&parse_narrative(&narrative), 2);

        assert!(pages.len() > 1);
        for page in &pages {
            for placement in page {
                let y = match placement {
                    Placement::Text { y, .. } | Placement::Image { y, .. } => *y,
                };
                assert!(y >= MARGIN - 0.01);
            }
        }
        let images = pages
            .iter()
            .flatten()
            .filter(|p| matches!(p, Placement::Image { .. }))
            .count();
        assert_eq!(images, 2);
    }

    #[test]
    fn test_bullets_are_indented() {
        let pages = layout(&parse_narrative("- Strong Q3 growth"), 0);
        let bullet = pages[0]
            .iter()
            .find_map(|p| match p {
                Placement::Text { text, x, .. } if text.starts_with('•') => Some(*x),
                _ => None,
            })
            .unwrap();
        assert!((bullet - (MARGIN + 20.0)).abs() < 0.01);
    }

    #[test]
    fn test_build_pdf_bytes() {
        let narrative =
            "### Summary\n#### Apple\n- Strong Q3 growth\nOverall performance was mixed.";
        let report = ReportBuilder::new().build_at(narrative, &[], timestamp()).unwrap();

        assert!(report.bytes.starts_with(b"%PDF"));
        assert_eq!(report.mime_type, "application/pdf");
        assert_eq!(report.file_name, "stock_analysis_report_20240701090503.pdf");
    }

    #[test]
    fn test_build_with_chart_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        image::RgbImage::from_pixel(80, 60, image::Rgb([20, 120, 200]))
            .save(&path)
            .unwrap();
        let artifact = ChartArtifact {
            label: "AAPL".to_string(),
            path,
        };

        let without = ReportBuilder::new().build_at("Body", &[], timestamp()).unwrap();
        let with = ReportBuilder::new()
            .build_at("Body", std::slice::from_ref(&artifact), timestamp())
            .unwrap();

        assert!(with.bytes.starts_with(b"%PDF"));
        assert!(with.bytes.len() > without.bytes.len());
    }

    #[test]
    fn test_missing_chart_is_a_report_error() {
        let artifact = ChartArtifact {
            label: "AAPL".to_string(),
            path: "/nonexistent/chart.png".into(),
        };
        let result = ReportBuilder::new().build_at("Body", &[artifact], timestamp());
        assert!(matches!(result, Err(DashboardError::Report(_))));
    }
}
