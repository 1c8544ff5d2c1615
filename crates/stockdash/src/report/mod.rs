//! PDF report: narrative markup plus chart snapshots

pub mod markup;
pub mod pdf;

pub use markup::{BULLET, Paragraph, ParagraphStyle, parse_line, parse_narrative};
pub use pdf::{REPORT_MIME_TYPE, REPORT_TITLE, Report, ReportBuilder, report_file_name};
