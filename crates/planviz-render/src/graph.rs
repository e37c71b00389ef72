//! Plan graph to layout graph.

use crate::text::{TextMeasurer, TextStyle, measure_label};
use crate::{PlanVizConfig, Result};
use planviz_core::PlanGraph;
use planviz_layout::{EdgeLabel, Graph, GraphOptions, LayoutGraph, NodeLabel};

/// Clusters with at least one node somewhere inside. Empty clusters are not drawn.
fn populated_clusters(plan: &PlanGraph) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for node in &plan.nodes {
        let mut cur = node.cluster.as_deref();
        while let Some(id) = cur {
            if out.contains(&id) {
                break;
            }
            out.push(id);
            cur = plan.cluster(id).and_then(|c| c.parent.as_deref());
        }
    }
    let skipped = plan.clusters.len().saturating_sub(out.len());
    if skipped > 0 {
        tracing::debug!(skipped, "skipping empty clusters");
    }
    out
}

/// Builds the compound layout graph for `plan` with measured labels.
///
/// Node sizes are left at zero; they are derived from the label and the padding hint once the
/// graph has been preprocessed. Edges are keyed `e<index>` so parallel edges survive.
pub fn build_layout_graph(
    plan: &PlanGraph,
    config: &PlanVizConfig,
    measurer: &dyn TextMeasurer,
) -> Result<LayoutGraph> {
    let style = TextStyle {
        font_size: config.font_size,
        ..Default::default()
    };
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        multigraph: true,
        compound: true,
    });
    g.set_graph(config.graph_label()?);

    let populated = populated_clusters(plan);
    for cluster in plan.clusters.iter().filter(|c| populated.contains(&c.id.as_str())) {
        let metrics = measure_label(measurer, &cluster.label, &style);
        g.set_node(
            cluster.id.clone(),
            NodeLabel {
                label_width: metrics.width,
                label_height: metrics.height,
                ..Default::default()
            },
        );
    }
    for node in plan.nodes.iter().filter(|n| plan.cluster(&n.id).is_none()) {
        let metrics = measure_label(measurer, &node.label, &style);
        g.set_node(
            node.id.clone(),
            NodeLabel {
                label_width: metrics.width,
                label_height: metrics.height,
                ..Default::default()
            },
        );
    }
    for cluster in plan.clusters.iter().filter(|c| populated.contains(&c.id.as_str())) {
        if let Some(parent) = &cluster.parent {
            g.set_parent(cluster.id.clone(), parent.clone());
        }
    }
    for node in &plan.nodes {
        if let Some(cluster) = &node.cluster {
            g.set_parent(node.id.clone(), cluster.clone());
        }
    }
    for (i, edge) in plan.edges.iter().enumerate() {
        g.set_edge_named(
            edge.source.clone(),
            edge.target.clone(),
            Some(format!("e{i}")),
            Some(EdgeLabel::default()),
        );
    }

    tracing::debug!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        "built layout graph"
    );
    Ok(g)
}
