//! Plain-text stand-ins for HTML labels.
//!
//! SVG rasterizers generally ignore `<foreignObject>`, which is where every plan label lives.
//! [`foreign_object_text_fallback`] returns a copy of a drawing where each label is replaced by
//! centered `<text>` lines carrying the label's visible text.

use planviz_render::html::visible_lines;
use planviz_render::position::to_float;
use planviz_render::util::fmt;
use planviz_render::{Drawing, Result};

/// Marks the groups that replaced a `foreignObject`.
pub const FALLBACK_ATTR: &str = "data-planviz-fallback";

pub fn foreign_object_text_fallback(drawing: &Drawing, font_size: f64) -> Result<Drawing> {
    let mut out = drawing.clone();
    let line_height = font_size * 1.2;
    let mut replaced = 0usize;

    for fo in out.select_tag("foreignObject") {
        let Some(parent) = out.element(fo)?.parent() else {
            continue;
        };
        let width = to_float(out.attr(fo, "width"));
        let height = to_float(out.attr(fo, "height"));
        let markup = out
            .find_tag(fo, "div")
            .and_then(|div| out.get(div))
            .and_then(|div| div.markup.clone())
            .unwrap_or_default();
        let lines = visible_lines(&markup);

        out.detach(fo)?;
        if lines.is_empty() || width <= 0.0 || height <= 0.0 {
            continue;
        }

        let group = out.append(parent, "g")?;
        out.set_attr(group, FALLBACK_ATTR, "text")?;
        let first = height / 2.0 - line_height * (lines.len() as f64 - 1.0) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            let text = out.append(group, "text")?;
            out.set_attr(text, "x", fmt(width / 2.0))?;
            out.set_attr(text, "y", fmt(first + i as f64 * line_height))?;
            out.set_attr(text, "text-anchor", "middle")?;
            out.set_attr(text, "dominant-baseline", "central")?;
            out.set_attr(text, "font-family", "sans-serif")?;
            out.set_attr(text, "font-size", fmt(font_size))?;
            out.set_attr(text, "fill", "#333333")?;
            out.set_text(text, line.as_str())?;
        }
        replaced += 1;
    }

    tracing::debug!(labels = replaced, "replaced foreignObject labels with text");
    Ok(out)
}
