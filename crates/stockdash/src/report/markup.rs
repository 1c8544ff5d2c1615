//! Line-oriented narrative markup
//!
//! Each line becomes one paragraph. Prefix rules are checked in order, so
//! longer prefixes that share a start with shorter ones must come first.

use serde::{Deserialize, Serialize};

/// Bullet glyph shown before bullet paragraphs
pub const BULLET: &str = "• ";

/// Paragraph styles of the report stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParagraphStyle {
    Title,
    Heading1,
    Heading2,
    BodyText,
    Bullet,
}

impl ParagraphStyle {
    /// Font size in points
    pub fn font_size(self) -> f32 {
        match self {
            Self::Title | Self::Heading1 => 18.0,
            Self::Heading2 => 14.0,
            Self::BodyText | Self::Bullet => 12.0,
        }
    }

    /// Baseline-to-baseline distance in points
    pub fn leading(self) -> f32 {
        match self {
            Self::Title | Self::Heading1 => 22.0,
            Self::Heading2 => 17.0,
            Self::BodyText | Self::Bullet => 14.5,
        }
    }

    pub fn bold(self) -> bool {
        matches!(self, Self::Title | Self::Heading1 | Self::Heading2)
    }

    pub fn centered(self) -> bool {
        self == Self::Title
    }

    pub fn space_before(self) -> f32 {
        if self == Self::Bullet { 6.0 } else { 0.0 }
    }

    pub fn space_after(self) -> f32 {
        match self {
            Self::Title | Self::Heading1 => 6.0,
            Self::Heading2 => 12.0,
            _ => 0.0,
        }
    }

    pub fn left_indent(self) -> f32 {
        if self == Self::Bullet { 20.0 } else { 0.0 }
    }
}

/// One styled paragraph of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    /// Text with any markup prefix removed
    pub text: String,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    /// Text as it appears in the document
    pub fn display_text(&self) -> String {
        match self.style {
            ParagraphStyle::Bullet => format!("{BULLET}{}", self.text),
            _ => self.text.clone(),
        }
    }
}

struct Rule {
    prefix: &'static str,
    style: ParagraphStyle,
}

const RULES: &[Rule] = &[
    Rule {
        prefix: "####",
        style: ParagraphStyle::Heading2,
    },
    Rule {
        prefix: "###",
        style: ParagraphStyle::Heading1,
    },
    Rule {
        prefix: "-",
        style: ParagraphStyle::Bullet,
    },
];

/// Classify a single line
pub fn parse_line(line: &str) -> Paragraph {
    RULES
        .iter()
        .find_map(|rule| {
            line.strip_prefix(rule.prefix)
                .map(|rest| Paragraph::new(rule.style, rest.trim()))
        })
        .unwrap_or_else(|| Paragraph::new(ParagraphStyle::BodyText, line))
}

/// Split a narrative into paragraphs, one per line
pub fn parse_narrative(text: &str) -> Vec<Paragraph> {
    text.split('\n')
        .map(|line| parse_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            parse_line("### Summary"),
            Paragraph::new(ParagraphStyle::Heading1, "Summary")
        );
        assert_eq!(
            parse_line("#### Apple"),
            Paragraph::new(ParagraphStyle::Heading2, "Apple")
        );
    }

    #[test]
    fn test_bullet_drops_marker_and_shows_glyph() {
        let p = parse_line("- Strong Q3 growth");
        assert_eq!(p, Paragraph::new(ParagraphStyle::Bullet, "Strong Q3 growth"));
        assert_eq!(p.display_text(), "• Strong Q3 growth");
    }

    #[test]
    fn test_body_text_is_verbatim() {
        let p = parse_line("Overall performance was mixed.");
        assert_eq!(p.style, ParagraphStyle::BodyText);
        assert_eq!(p.display_text(), "Overall performance was mixed.");

        // Only the listed prefixes are markup
        let p = parse_line("## Not a heading here ");
        assert_eq!(p, Paragraph::new(ParagraphStyle::BodyText, "## Not a heading here "));
    }

    #[test]
    fn test_narrative_keeps_empty_lines() {
        let paragraphs = parse_narrative("### Summary\r\n\n- AAPL led\nDone.");
        let styles: Vec<ParagraphStyle> = paragraphs.iter().map(|p| p.style).collect();

        assert_eq!(
            styles,
            vec![
                ParagraphStyle::Heading1,
                ParagraphStyle::BodyText,
                ParagraphStyle::Bullet,
                ParagraphStyle::BodyText,
            ]
        );
        assert_eq!(paragraphs[0].text, "Summary");
        assert!(paragraphs[1].text.is_empty());
    }

    #[test]
    fn test_stylesheet() {
        assert!(ParagraphStyle::Title.centered());
        assert!(ParagraphStyle::Heading2.bold());
        assert!(!ParagraphStyle::BodyText.bold());
        assert!((ParagraphStyle::Bullet.left_indent() - 20.0).abs() < f32::EPSILON);
        assert!((ParagraphStyle::Heading2.space_after() - 12.0).abs() < f32::EPSILON);
    }
}
