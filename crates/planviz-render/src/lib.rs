#![forbid(unsafe_code)]

//! Headless query plan drawing.
//!
//! [`PlanViz`] is the render context: it owns the graph description, the detail panel state,
//! the page metadata and the current drawing. A render runs the whole pipeline: stage links,
//! view state, parsing, layout hints, layout, scene emission, post-processing, viewport sizing
//! and tooltips.

pub mod config;
pub mod curve;
pub mod drawing;
pub mod error;
pub mod geom;
pub mod graph;
pub mod html;
pub mod model;
pub mod position;
pub mod postprocess;
pub mod preprocess;
pub mod scene;
pub mod text;
pub mod util;
pub mod viewport;

pub use config::PlanVizConfig;
pub use drawing::{Drawing, Element, ElementId};
pub use error::{Error, Result};
pub use model::PlanLayout;
pub use viewport::Viewport;

use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use planviz_core::{PageMetadata, PlanGraph, ViewState, parse_plan_graph, rewrite_stage_links};
use planviz_layout::LayoutGraph;
use std::sync::Arc;

/// Lays out a parsed plan: layout graph, hints, node sizes, layout.
pub fn layout_plan(
    plan: &PlanGraph,
    config: &PlanVizConfig,
    measurer: &dyn TextMeasurer,
) -> Result<LayoutGraph> {
    let mut g = graph::build_layout_graph(plan, config, measurer)?;
    preprocess::preprocess(&mut g, config.node_padding, config.interpolation()?);
    preprocess::fit_node_sizes(&mut g, config);
    planviz_layout::layout(&mut g);
    Ok(g)
}

/// Parses, lays out and draws `text` without any page state.
pub fn render_svg(text: &str, config: &PlanVizConfig) -> Result<String> {
    let mut viz = PlanViz::new(text).with_config(config.clone());
    viz.render()?;
    Ok(viz.svg().unwrap_or_default())
}

/// One finished drawing.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub drawing: Drawing,
    pub viewport: Viewport,
    pub node_count: usize,
    pub edge_count: usize,
    pub cluster_count: usize,
}

#[derive(Clone)]
pub struct PlanViz {
    description: String,
    view: ViewState,
    config: PlanVizConfig,
    metadata: PageMetadata,
    measurer: Arc<dyn TextMeasurer + Send + Sync>,
    current: Option<Rendered>,
}

impl std::fmt::Debug for PlanViz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanViz")
            .field("description_len", &self.description.len())
            .field("view", &self.view)
            .field("config", &self.config)
            .field("metadata", &self.metadata)
            .field("rendered", &self.current.is_some())
            .finish()
    }
}

impl PlanViz {
    /// Creates a context for `description`, seeding the view state from its panel markers.
    pub fn new(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            view: ViewState::from_description(&description),
            description,
            config: PlanVizConfig::default(),
            metadata: PageMetadata::default(),
            measurer: Arc::new(DeterministicTextMeasurer::default()),
            current: None,
        }
    }

    pub fn with_config(mut self, config: PlanVizConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_metadata(mut self, metadata: PageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_view_state(mut self, view: ViewState) -> Self {
        self.view = view;
        self
    }

    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn config(&self) -> &PlanVizConfig {
        &self.config
    }

    pub fn metadata(&self) -> &PageMetadata {
        &self.metadata
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    /// Mutable view state; changes show up on the next [`PlanViz::rerender`].
    pub fn view_state_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn rendered(&self) -> Option<&Rendered> {
        self.current.as_ref()
    }

    pub fn drawing(&self) -> Option<&Drawing> {
        self.current.as_ref().map(|r| &r.drawing)
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.current.as_ref().map(|r| r.viewport)
    }

    /// Serialized current drawing.
    pub fn svg(&self) -> Option<String> {
        self.drawing().map(Drawing::to_svg)
    }

    /// The description text the next render will parse.
    pub fn effective_description(&self) -> String {
        let linked = rewrite_stage_links(&self.description, self.metadata.stylesheet_href.as_deref());
        self.view.apply(&linked)
    }

    /// Renders once. Returns `false` without doing anything when a drawing already exists.
    pub fn render(&mut self) -> Result<bool> {
        if self.current.is_some() {
            tracing::debug!("drawing already present; skipping render");
            return Ok(false);
        }
        let rendered = self.build()?;
        tracing::info!(
            nodes = rendered.node_count,
            edges = rendered.edge_count,
            clusters = rendered.cluster_count,
            "rendered plan"
        );
        self.current = Some(rendered);
        self.setup_tooltips();
        Ok(true)
    }

    /// Builds a new drawing and swaps it in. On failure the previous drawing stays.
    pub fn rerender(&mut self) -> Result<()> {
        let rendered = self.build()?;
        tracing::info!(
            nodes = rendered.node_count,
            edges = rendered.edge_count,
            clusters = rendered.cluster_count,
            "re-rendered plan"
        );
        self.current = Some(rendered);
        self.setup_tooltips();
        Ok(())
    }

    /// Flips one detail panel and re-renders. Returns the panel's new visibility.
    pub fn toggle_panel(&mut self, id: u32) -> Result<bool> {
        let visible = self.view.toggle_panel(id);
        self.rerender()?;
        Ok(visible)
    }

    pub fn expand_all(&mut self, visible: bool) -> Result<()> {
        self.view.expand_all(visible);
        self.rerender()
    }

    pub fn set_show_hidden_metrics(&mut self, show: bool) -> Result<()> {
        self.view.set_show_hidden_metrics(show);
        self.rerender()
    }

    fn build(&self) -> Result<Rendered> {
        self.config.validate()?;
        let text = self.effective_description();
        let plan = parse_plan_graph(&text)?;
        let g = layout_plan(&plan, &self.config, self.measurer.as_ref())?;

        let mut drawing = scene::emit_scene(&plan, &g, &self.config)?;
        postprocess::postprocess(&mut drawing, &self.config)?;
        let viewport = viewport::size_viewport(&mut drawing, &self.config)?;

        Ok(Rendered {
            node_count: drawing.select_class(Some("g"), "node").len(),
            edge_count: drawing.select_class(Some("g"), "edgePath").len(),
            cluster_count: drawing.select_class(Some("g"), "cluster").len(),
            drawing,
            viewport,
        })
    }

    /// Attaches the metadata tooltip of plan node `node_index` as a `<title>` on its groups.
    /// Returns the number of groups touched; no tooltip or no drawing touches none.
    pub fn setup_tooltip(&mut self, node_index: usize) -> Result<usize> {
        let Some(text) = self.metadata.tooltip(node_index).map(str::to_string) else {
            return Ok(0);
        };
        let Some(rendered) = self.current.as_mut() else {
            return Ok(0);
        };
        let drawing = &mut rendered.drawing;
        let class = scene::node_index_class(node_index);
        let groups = drawing.select_class(Some("g"), &class);
        for &group in &groups {
            let stale: Vec<ElementId> = drawing
                .element(group)?
                .children()
                .iter()
                .copied()
                .filter(|&c| drawing.get(c).is_some_and(|e| e.tag == "title"))
                .collect();
            for title in stale {
                drawing.detach(title)?;
            }
            let title = drawing.append(group, "title")?;
            drawing.set_text(title, text.as_str())?;
        }
        Ok(groups.len())
    }

    /// [`PlanViz::setup_tooltip`] for every node the metadata describes.
    pub fn setup_tooltips(&mut self) -> usize {
        let mut touched = 0;
        for i in 0..self.metadata.node_count() {
            match self.setup_tooltip(i) {
                Ok(n) => touched += n,
                Err(err) => tracing::warn!(node = i, %err, "failed to attach tooltip"),
            }
        }
        touched
    }
}

#[cfg(test)]
mod tests;
