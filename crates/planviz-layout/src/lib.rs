#![forbid(unsafe_code)]

//! Layered graph layout for query plan drawings.
//!
//! The engine follows the classic Sugiyama/dagre phases on a compound graph: leaf nodes are
//! ranked and ordered, clusters (nodes with children) become boxes around their descendants.
//! Everything runs on one thread and is deterministic for a given insertion order.

pub mod graph;

mod acyclic;
mod coordinate_system;
mod layering;
mod order;
mod position;
mod rank;
mod route;

pub use graph::{EdgeKey, Graph, GraphOptions};

use serde::{Deserialize, Serialize};

pub type LayoutGraph = Graph<NodeLabel, EdgeLabel, GraphLabel>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

impl RankDir {
    /// Parses a Graphviz `rankdir` value (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TB" => Some(Self::TB),
            "BT" => Some(Self::BT),
            "LR" => Some(Self::LR),
            "RL" => Some(Self::RL),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLabel {
    pub rankdir: RankDir,
    pub nodesep: f64,
    pub ranksep: f64,
    pub edgesep: f64,
    pub marginx: f64,
    pub marginy: f64,
    /// Space between a cluster's border and its content.
    pub cluster_padding: f64,

    /// Drawing size, written by [`layout`].
    pub width: f64,
    pub height: f64,
}

impl Default for GraphLabel {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            nodesep: 50.0,
            ranksep: 50.0,
            edgesep: 10.0,
            marginx: 0.0,
            marginy: 0.0,
            cluster_padding: 10.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeLabel {
    /// Outer size of a leaf. For a cluster this is the minimum box width (and is replaced by
    /// the computed size).
    pub width: f64,
    pub height: f64,
    /// Padding between the label and the node border.
    pub padding: f64,
    /// Measured label box.
    pub label_width: f64,
    pub label_height: f64,
    /// Vertical space kept free at the top of a cluster for its label.
    pub label_band: f64,

    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rank: Option<usize>,
    pub order: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    Basis,
}

impl Interpolation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "linear" => Some(Self::Linear),
            "basis" => Some(Self::Basis),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Basis => "basis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLabel {
    pub minlen: usize,
    pub interpolation: Interpolation,
    /// Polyline from the source border to the target border, written by [`layout`].
    pub points: Vec<Point>,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            minlen: 1,
            interpolation: Interpolation::Linear,
            points: Vec::new(),
        }
    }
}

/// Lays out `g` in place.
///
/// Leaves get `x`/`y` (centers), `rank` and `order`; clusters get `x`/`y`/`width`/`height` of
/// their box; edges between leaves get `points`. The graph label receives the drawing size,
/// margins included.
pub fn layout(g: &mut LayoutGraph) {
    coordinate_system::adjust(g);

    let mut work = layering::Layering::build(g);
    if work.is_empty() {
        g.graph_mut().width = 2.0 * g.graph().marginx;
        g.graph_mut().height = 2.0 * g.graph().marginy;
        return;
    }
    order::run(&mut work);
    position::run(&mut work, g.graph());
    work.write_back(g);
    route::run(g, &work);

    coordinate_system::undo(g);
    translate(g);

    tracing::debug!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        ranks = work.layers.len(),
        width = g.graph().width,
        height = g.graph().height,
        "layout done"
    );
}

/// Shifts the drawing so it starts at the graph margins and records its size.
fn translate(g: &mut LayoutGraph) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let mut extend = |x: f64, y: f64, w: f64, h: f64| {
        min_x = min_x.min(x - w / 2.0);
        max_x = max_x.max(x + w / 2.0);
        min_y = min_y.min(y - h / 2.0);
        max_y = max_y.max(y + h / 2.0);
    };
    g.for_each_node_mut(|_id, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            extend(x, y, n.width, n.height);
        }
    });
    g.for_each_edge_mut(|_key, e| {
        for p in &e.points {
            extend(p.x, p.y, 0.0, 0.0);
        }
    });
    if !min_x.is_finite() || !min_y.is_finite() {
        return;
    }

    let marginx = g.graph().marginx;
    let marginy = g.graph().marginy;
    let dx = marginx - min_x;
    let dy = marginy - min_y;
    g.for_each_node_mut(|_id, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            n.x = Some(x + dx);
            n.y = Some(y + dy);
        }
    });
    g.for_each_edge_mut(|_key, e| {
        for p in &mut e.points {
            p.x += dx;
            p.y += dy;
        }
    });

    let label = g.graph_mut();
    label.width = max_x - min_x + 2.0 * marginx;
    label.height = max_y - min_y + 2.0 * marginy;
}
