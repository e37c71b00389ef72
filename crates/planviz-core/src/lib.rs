#![forbid(unsafe_code)]

//! Query plan graph description parsing and page state (headless).
//!
//! The SQL UI emits each query plan as a DOT description whose node labels are HTML fragments
//! (operator name, metrics tables, collapsible detail panels). This crate turns that text into a
//! [`PlanGraph`] and owns the small amount of page state that feeds back into the text before a
//! render: detail panel visibility ([`ViewState`]), stage link prefixing and page metadata.

pub mod details;
pub mod dot;
pub mod error;
pub mod links;
pub mod metadata;
pub mod model;

pub use details::ViewState;
pub use error::{Error, Result};
pub use links::rewrite_stage_links;
pub use metadata::PageMetadata;
pub use model::{Label, LabelKind, PlanCluster, PlanEdge, PlanGraph, PlanNode};

/// Parses a graph description into a [`PlanGraph`].
pub fn parse_plan_graph(text: &str) -> Result<PlanGraph> {
    let dot = dot::parse_dot(text.trim())?;
    Ok(PlanGraph::from_dot(&dot))
}

#[cfg(test)]
mod tests;
