//! Cosmetic fixes applied to a freshly emitted drawing.

use crate::PlanVizConfig;
use crate::Result;
use crate::drawing::{Drawing, ElementId};
use crate::position::{to_float, translation};
use crate::util::fmt;

/// Holds a cluster label's original x so repositioning can be re-applied.
const ANCHOR_ATTR: &str = "data-anchor-x";

pub fn postprocess(drawing: &mut Drawing, config: &PlanVizConfig) -> Result<()> {
    let rects = round_corners(drawing, config.corner_radius)?;
    let tagged = classify(
        drawing,
        &config.engine_marker,
        &config.node_class,
        &config.cluster_class,
    )?;
    let moved = adjust_cluster_labels(drawing, config.cluster_label_inset)?;
    tracing::debug!(rects, tagged, moved, "post-processed drawing");
    Ok(())
}

/// Sets `rx`/`ry` on every rectangle. Returns the number of rectangles.
pub fn round_corners(drawing: &mut Drawing, radius: f64) -> Result<usize> {
    let rects = drawing.select_tag("rect");
    let value = fmt(radius);
    for &rect in &rects {
        drawing.set_attr(rect, "rx", value.as_str())?;
        drawing.set_attr(rect, "ry", value.as_str())?;
    }
    Ok(rects.len())
}

/// Tags the direct children of `g.nodes` and `g.clusters` whose `name` contains `marker`, and
/// removes the tag from the others. Returns the number of tagged elements.
pub fn classify(
    drawing: &mut Drawing,
    marker: &str,
    node_class: &str,
    cluster_class: &str,
) -> Result<usize> {
    let mut tagged = 0;
    for (container, class) in [("nodes", node_class), ("clusters", cluster_class)] {
        for group in drawing.select_class(Some("g"), container) {
            let children: Vec<ElementId> = drawing.element(group)?.children().to_vec();
            for child in children {
                let hit = drawing
                    .attr(child, "name")
                    .is_some_and(|name| !marker.is_empty() && name.contains(marker));
                drawing.set_class(child, class, hit)?;
                tagged += usize::from(hit);
            }
        }
    }
    Ok(tagged)
}

/// Moves each cluster label from the cluster's right border to `inset` inside it:
/// `x' = x - label_width - inset`, `y` unchanged.
///
/// Labels without a `translate` are left alone. Returns the number of labels moved.
pub fn adjust_cluster_labels(drawing: &mut Drawing, inset: f64) -> Result<usize> {
    let mut moved = 0;
    for cluster in drawing.select_class(Some("g"), "cluster") {
        let Some(label) = drawing
            .descendants(cluster)
            .into_iter()
            .find(|&d| drawing.has_class(d, "label"))
        else {
            continue;
        };
        let Some(transform) = drawing.attr(label, "transform").map(str::to_string) else {
            continue;
        };
        if !transform.contains("translate(") {
            continue;
        }
        let Some(current) = translation(&transform) else {
            tracing::warn!(
                cluster = drawing.attr(cluster, "id").unwrap_or(""),
                transform = %transform,
                "skipping cluster label with an unparsable transform"
            );
            continue;
        };

        let label_width = drawing
            .find_tag(label, "foreignObject")
            .map_or(0.0, |fo| to_float(drawing.attr(fo, "width")));
        let anchor_x = match drawing.attr(label, ANCHOR_ATTR) {
            Some(anchor) => to_float(Some(anchor)),
            None => current.x,
        };
        let x = anchor_x - label_width - inset;
        drawing.set_attr(label, ANCHOR_ATTR, fmt(anchor_x))?;
        drawing.set_attr(
            label,
            "transform",
            format!("translate({},{})", fmt(x), fmt(current.y)),
        )?;
        moved += 1;
    }
    Ok(moved)
}
