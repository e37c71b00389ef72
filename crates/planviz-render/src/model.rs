use planviz_core::PlanGraph;
use planviz_layout::{EdgeKey, LayoutGraph};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label_width: f64,
    pub label_height: f64,
    pub rank: Option<usize>,
    pub order: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCluster {
    pub id: String,
    pub parent: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    pub interpolation: String,
    pub points: Vec<LayoutPoint>,
}

/// Serializable geometry of a laid-out plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanLayout {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<LayoutNode>,
    pub clusters: Vec<LayoutCluster>,
    pub edges: Vec<LayoutEdge>,
}

impl PlanLayout {
    pub fn from_graph(plan: &PlanGraph, g: &LayoutGraph) -> Self {
        let nodes = plan
            .nodes
            .iter()
            .filter(|n| plan.cluster(&n.id).is_none())
            .filter_map(|n| {
                let label = g.node(&n.id)?;
                Some(LayoutNode {
                    id: n.id.clone(),
                    x: label.x?,
                    y: label.y?,
                    width: label.width,
                    height: label.height,
                    label_width: label.label_width,
                    label_height: label.label_height,
                    rank: label.rank,
                    order: label.order,
                })
            })
            .collect();
        let clusters = plan
            .clusters
            .iter()
            .filter_map(|c| {
                let label = g.node(&c.id)?;
                Some(LayoutCluster {
                    id: c.id.clone(),
                    parent: c.parent.clone(),
                    x: label.x?,
                    y: label.y?,
                    width: label.width,
                    height: label.height,
                })
            })
            .collect();
        let edges = plan
            .edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                let key = EdgeKey::new(&e.source, &e.target, Some(format!("e{i}")));
                let label = g.edge_by_key(&key)?;
                Some(LayoutEdge {
                    source: e.source.clone(),
                    target: e.target.clone(),
                    interpolation: label.interpolation.as_str().to_string(),
                    points: label
                        .points
                        .iter()
                        .map(|p| LayoutPoint { x: p.x, y: p.y })
                        .collect(),
                })
            })
            .collect();
        Self {
            width: g.graph().width,
            height: g.graph().height,
            nodes,
            clusters,
            edges,
        }
    }
}
