#![forbid(unsafe_code)]

//! `planviz` draws query plan graphs headlessly.
//!
//! It parses the SQL UI's DOT description, lays the plan out, and emits an SVG drawing with
//! the same grouping, classes and tooltips the browser page shows.
//!
//! # Features
//!
//! - `raster`: PNG/JPG export via pure-Rust SVG rasterization (`planviz::raster`)

pub use planviz_core::{
    Label, LabelKind, PageMetadata, PlanCluster, PlanEdge, PlanGraph, PlanNode, ViewState,
    parse_plan_graph, rewrite_stage_links,
};
pub use planviz_render::{
    Drawing, Element, ElementId, PlanLayout, PlanViz, PlanVizConfig, Rendered, Viewport,
    layout_plan, render_svg,
};

pub mod plan {
    pub use planviz_core::*;
}

pub mod layout {
    pub use planviz_layout::*;
}

pub mod render {
    pub use planviz_render::text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};
    pub use planviz_render::*;
}

pub mod fallback;

#[cfg(feature = "raster")]
pub mod raster;

/// Turns a page title into a file name stem that is safe on common file systems.
///
/// Path separators, reserved characters and control characters become `_`; surrounding
/// whitespace and dots are trimmed. An empty result falls back to `plan`.
pub fn file_stem_for_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        let bad = ch.is_control() || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|');
        out.push(if bad { '_' } else { ch });
    }
    let out = out.trim().trim_matches('.').trim();
    if out.is_empty() {
        "plan".to_string()
    } else {
        out.to_string()
    }
}

/// `<title>.<extension>` for a page title, `plan.<extension>` without one.
pub fn export_file_name(title: Option<&str>, extension: &str) -> String {
    format!("{}.{extension}", file_stem_for_title(title.unwrap_or("")))
}

#[cfg(test)]
mod tests;
