//! Drawing emission.
//!
//! The laid-out graph becomes the nested group structure the post-processor and the viewport
//! sizer work on: clusters, edge paths, edge labels and nodes each live in their own group
//! under `g.output`, and every shape is positioned by a `translate` on its group.

use crate::curve::path_data;
use crate::drawing::{Drawing, ElementId};
use crate::text::label_lines;
use crate::util::{escape_xml, fmt};
use crate::{PlanVizConfig, Result, html};
use planviz_core::{Label, LabelKind, PlanGraph, PlanNode};
use planviz_layout::{EdgeKey, LayoutGraph, NodeLabel};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
pub const ARROWHEAD_ID: &str = "arrowhead";

/// The one embedded stylesheet.
pub fn stylesheet(config: &PlanVizConfig) -> String {
    format!(
        ".node rect {{ fill: #ffffff; stroke: #3c3c3c; stroke-width: 1px; }}\n\
         .node.{node} rect {{ fill: #fff1e0; }}\n\
         .cluster rect {{ fill: #e4f1f6; stroke: #a3b1b6; stroke-width: 1px; }}\n\
         .cluster.{cluster} rect {{ fill: #fdf4e8; }}\n\
         .edgePath path {{ fill: none; stroke: #444444; stroke-width: 1.5px; }}\n\
         #{ARROWHEAD_ID} path {{ fill: #444444; stroke: none; }}\n\
         .label div {{ font-family: sans-serif; font-size: {size}px; color: #333333; }}\n",
        node = config.node_class,
        cluster = config.cluster_class,
        size = fmt(config.font_size),
    )
}

fn translate(x: f64, y: f64) -> String {
    format!("translate({},{})", fmt(x), fmt(y))
}

/// Class of the group a tooltip for plan node `index` attaches to.
pub fn node_index_class(index: usize) -> String {
    format!("node_{index}")
}

/// Index used for a node's `node_<index>` class: its numeric id, else its insertion position.
fn node_index(node: &PlanNode, position: usize) -> usize {
    node.id.trim().parse::<usize>().unwrap_or(position)
}

/// Layout label of `id` when the node received a position.
fn placed<'g>(g: &'g LayoutGraph, id: &str) -> Option<&'g NodeLabel> {
    g.node(id).filter(|n| n.x.is_some() && n.y.is_some())
}

struct Emitter<'a> {
    drawing: Drawing,
    g: &'a LayoutGraph,
    config: &'a PlanVizConfig,
}

/// Writes the laid-out graph into a new drawing.
pub fn emit_scene(plan: &PlanGraph, g: &LayoutGraph, config: &PlanVizConfig) -> Result<Drawing> {
    let mut emitter = Emitter {
        drawing: Drawing::new("svg"),
        g,
        config,
    };
    emitter.emit(plan)?;
    Ok(emitter.drawing)
}

impl Emitter<'_> {
    fn emit(&mut self, plan: &PlanGraph) -> Result<()> {
        let g = self.g;
        let root = self.drawing.root();
        self.drawing.set_attr(root, "xmlns", SVG_NS)?;
        self.drawing.set_attr(root, "class", "plan-viz")?;

        let style = self.drawing.append(root, "style")?;
        self.drawing.set_text(style, stylesheet(self.config))?;
        self.arrowhead(root)?;

        let container = self.drawing.append(root, "g")?;
        let output = self.group(container, "output")?;
        let clusters = self.group(output, "clusters")?;
        let edge_paths = self.group(output, "edgePaths")?;
        self.group(output, "edgeLabels")?;
        let nodes = self.group(output, "nodes")?;

        let mut cluster_count = 0usize;
        for cluster in &plan.clusters {
            let Some(label) = placed(g, &cluster.id) else {
                tracing::debug!(cluster = %cluster.id, "cluster was not laid out");
                continue;
            };
            let group = self.drawing.append(clusters, "g")?;
            self.drawing.set_attr(group, "class", "cluster")?;
            self.drawing.set_attr(group, "id", cluster.id.as_str())?;
            if let Some(name) = &cluster.name {
                self.drawing.set_attr(group, "name", name.as_str())?;
            }
            self.cluster(group, label, &cluster.label)?;
            cluster_count += 1;
        }

        let mut edge_count = 0usize;
        for (i, edge) in plan.edges.iter().enumerate() {
            let key = EdgeKey::new(&edge.source, &edge.target, Some(&format!("e{i}")));
            let Some(label) = g.edge_by_key(&key).filter(|e| !e.points.is_empty()) else {
                let attached_to_cluster =
                    plan.cluster(&edge.source).is_some() || plan.cluster(&edge.target).is_some();
                tracing::warn!(
                    source = %edge.source,
                    target = %edge.target,
                    attached_to_cluster,
                    "dropping edge without a route"
                );
                continue;
            };
            let group = self.drawing.append(edge_paths, "g")?;
            self.drawing.set_attr(group, "class", "edgePath")?;
            let path = self.drawing.append(group, "path")?;
            self.drawing.set_attr(path, "class", "path")?;
            self.drawing
                .set_attr(path, "d", path_data(&label.points, label.interpolation))?;
            self.drawing
                .set_attr(path, "marker-end", format!("url(#{ARROWHEAD_ID})"))?;
            edge_count += 1;
        }

        let mut node_count = 0usize;
        for (position, node) in plan.nodes.iter().enumerate() {
            if plan.cluster(&node.id).is_some() {
                continue;
            }
            let Some(label) = placed(g, &node.id) else {
                continue;
            };
            let group = self.drawing.append(nodes, "g")?;
            let mut classes = vec!["node".to_string()];
            if let Some(class) = &node.class {
                classes.extend(class.split_whitespace().map(str::to_string));
            }
            let index_class = node_index_class(node_index(node, position));
            if !classes.contains(&index_class) {
                classes.push(index_class);
            }
            self.drawing.set_attr(group, "class", classes.join(" "))?;
            let dom_id = node.attrs.get("id").unwrap_or(&node.id);
            self.drawing.set_attr(group, "id", dom_id.as_str())?;
            if let Some(name) = &node.name {
                self.drawing.set_attr(group, "name", name.as_str())?;
            }
            self.node(group, label, &node.label)?;
            node_count += 1;
        }

        tracing::debug!(
            clusters = cluster_count,
            edges = edge_count,
            nodes = node_count,
            "emitted scene"
        );
        Ok(())
    }

    fn group(&mut self, parent: ElementId, class: &str) -> Result<ElementId> {
        let g = self.drawing.append(parent, "g")?;
        self.drawing.set_attr(g, "class", class)?;
        Ok(g)
    }

    fn arrowhead(&mut self, root: ElementId) -> Result<()> {
        let defs = self.drawing.append(root, "defs")?;
        let marker = self.drawing.append(defs, "marker")?;
        for (name, value) in [
            ("id", ARROWHEAD_ID),
            ("viewBox", "0 0 10 10"),
            ("refX", "9"),
            ("refY", "5"),
            ("markerUnits", "strokeWidth"),
            ("markerWidth", "8"),
            ("markerHeight", "6"),
            ("orient", "auto"),
        ] {
            self.drawing.set_attr(marker, name, value)?;
        }
        let path = self.drawing.append(marker, "path")?;
        self.drawing.set_attr(path, "d", "M 0 0 L 10 5 L 0 10 z")?;
        Ok(())
    }

    fn rect(&mut self, group: ElementId, width: f64, height: f64) -> Result<()> {
        let rect = self.drawing.append(group, "rect")?;
        self.drawing.set_attr(rect, "x", fmt(-width / 2.0))?;
        self.drawing.set_attr(rect, "y", fmt(-height / 2.0))?;
        self.drawing.set_attr(rect, "width", fmt(width))?;
        self.drawing.set_attr(rect, "height", fmt(height))?;
        Ok(())
    }

    fn cluster(&mut self, group: ElementId, layout: &NodeLabel, label: &Label) -> Result<()> {
        let (x, y) = (layout.x.unwrap_or(0.0), layout.y.unwrap_or(0.0));
        self.drawing.set_attr(group, "transform", translate(x, y))?;
        self.rect(group, layout.width, layout.height)?;
        if layout.label_width <= 0.0 {
            return Ok(());
        }
        // Anchored at the right border; the post-processor moves it inside.
        let label_group = self.group(group, "label")?;
        self.drawing.set_attr(
            label_group,
            "transform",
            translate(
                layout.width / 2.0,
                -layout.height / 2.0 + self.config.cluster_padding,
            ),
        )?;
        self.foreign_object(label_group, layout, label)
    }

    fn node(&mut self, group: ElementId, layout: &NodeLabel, label: &Label) -> Result<()> {
        let (x, y) = (layout.x.unwrap_or(0.0), layout.y.unwrap_or(0.0));
        self.drawing.set_attr(group, "transform", translate(x, y))?;
        self.rect(group, layout.width, layout.height)?;
        let label_group = self.group(group, "label")?;
        let inner = self.drawing.append(label_group, "g")?;
        self.drawing.set_attr(
            inner,
            "transform",
            translate(-layout.label_width / 2.0, -layout.label_height / 2.0),
        )?;
        self.foreign_object(inner, layout, label)
    }

    fn foreign_object(&mut self, parent: ElementId, layout: &NodeLabel, label: &Label) -> Result<()> {
        let fo = self.drawing.append(parent, "foreignObject")?;
        self.drawing.set_attr(fo, "width", fmt(layout.label_width))?;
        self.drawing.set_attr(fo, "height", fmt(layout.label_height))?;
        let div = self.drawing.append(fo, "div")?;
        self.drawing.set_attr(div, "xmlns", XHTML_NS)?;
        self.drawing
            .set_attr(div, "style", "display: inline-block; white-space: nowrap;")?;
        let markup = match label.kind {
            LabelKind::Html => html::to_xhtml(&label.text),
            LabelKind::Text => label_lines(label)
                .iter()
                .map(|line| escape_xml(line))
                .collect::<Vec<_>>()
                .join("<br/>"),
        };
        self.drawing.set_markup(div, markup)
    }
}
