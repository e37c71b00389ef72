use crate::html;
use planviz_core::{Label, LabelKind};
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 14.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    /// Measures already split lines of plain text.
    fn measure_lines(&self, lines: &[String], style: &TextStyle) -> TextMetrics;

    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        self.measure_lines(&lines, style)
    }
}

/// Font-free measurer: every column is `char_width_factor` em wide, every line
/// `line_height_factor` em tall. Zero factors fall back to 0.6 and 1.2.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure_lines(&self, lines: &[String], style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = style.font_size.max(1.0);
        let columns = lines.iter().map(|l| l.width()).max().unwrap_or(0);
        let line_count = lines.len().max(1);
        TextMetrics {
            width: columns as f64 * font_size * char_width_factor,
            height: line_count as f64 * font_size * line_height_factor,
            line_count,
        }
    }
}

/// Lines a label shows once drawn: visible HTML text, or the plain text split on line breaks.
pub fn label_lines(label: &Label) -> Vec<String> {
    match label.kind {
        LabelKind::Html => html::visible_lines(&label.text),
        LabelKind::Text => html::plain_lines(&label.text),
    }
}

pub fn measure_label(measurer: &dyn TextMeasurer, label: &Label, style: &TextStyle) -> TextMetrics {
    let lines = label_lines(label);
    if lines.iter().all(|l| l.is_empty()) {
        return TextMetrics {
            width: 0.0,
            height: 0.0,
            line_count: 0,
        };
    }
    measurer.measure_lines(&lines, style)
}
