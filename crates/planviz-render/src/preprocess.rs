//! Layout hints stamped on the graph before layout.

use crate::PlanVizConfig;
use planviz_layout::{Interpolation, LayoutGraph};

/// Sets the label padding of every node and the curve interpolation of every edge.
pub fn preprocess(g: &mut LayoutGraph, padding: f64, interpolation: Interpolation) {
    g.for_each_node_mut(|_, node| node.padding = padding);
    g.for_each_edge_mut(|_, edge| edge.interpolation = interpolation);
    tracing::debug!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        padding,
        interpolation = interpolation.as_str(),
        "preprocessed layout graph"
    );
}

/// Derives node sizes from the measured labels and the padding hint.
///
/// Leaves wrap their label plus padding on every side. Clusters get a minimum width that fits
/// their label inset from both borders, and a label band as tall as the label plus the cluster
/// padding.
pub fn fit_node_sizes(g: &mut LayoutGraph, config: &PlanVizConfig) {
    let clusters: Vec<bool> = g.nodes().map(|id| g.is_cluster(id)).collect();
    let inset = config.cluster_label_inset;
    let cluster_padding = config.cluster_padding;
    let mut i = 0usize;
    g.for_each_node_mut(|_, node| {
        if clusters[i] {
            node.width = node.label_width + 2.0 * inset;
            node.label_band = if node.label_height > 0.0 {
                node.label_height + cluster_padding
            } else {
                0.0
            };
        } else {
            node.width = node.label_width + 2.0 * node.padding;
            node.height = node.label_height + 2.0 * node.padding;
        }
        i += 1;
    });
}
