//! Edge polylines.
//!
//! Every edge runs from its source border through the dummy nodes of its chain to its target
//! border. Single-rank edges get a midpoint so curve interpolation has a control point to bend
//! around. Reversed edges are routed along their chain and flipped back at the end.

use crate::layering::{Layering, WorkNode};
use crate::{LayoutGraph, Point};

pub(crate) fn run(g: &mut LayoutGraph, work: &Layering) {
    for edge in &work.edges {
        let (Some(&first), Some(&last)) = (edge.chain.first(), edge.chain.last()) else {
            continue;
        };
        let inner: Vec<Point> = edge.chain[1..edge.chain.len() - 1]
            .iter()
            .map(|&d| center(&work.nodes[d]))
            .collect();

        let source = &work.nodes[first];
        let target = &work.nodes[last];
        let toward_source = inner.first().copied().unwrap_or_else(|| center(target));
        let toward_target = inner.last().copied().unwrap_or_else(|| center(source));
        let start = intersect_rect(source, toward_source);
        let end = intersect_rect(target, toward_target);

        let mut points = Vec::with_capacity(inner.len() + 2);
        points.push(start);
        if inner.is_empty() {
            points.push(Point {
                x: (start.x + end.x) / 2.0,
                y: (start.y + end.y) / 2.0,
            });
        } else {
            points.extend(inner);
        }
        points.push(end);
        if edge.reversed {
            points.reverse();
        }

        if let Some(label) = g.edge_mut_by_key(&edge.key) {
            label.points = points;
        }
    }

    for (key, v) in &work.loops {
        let node = &work.nodes[*v];
        let x0 = node.x + node.width / 2.0;
        let x1 = x0 + 10.0;
        let y_top = node.y - node.height / 4.0;
        let y_bot = node.y + node.height / 4.0;
        if let Some(label) = g.edge_mut_by_key(key) {
            label.points = vec![
                Point { x: x0, y: y_top },
                Point { x: x1, y: y_top },
                Point { x: x1, y: y_bot },
                Point { x: x0, y: y_bot },
            ];
        }
    }
}

fn center(node: &WorkNode) -> Point {
    Point {
        x: node.x,
        y: node.y,
    }
}

/// Point where the segment from the node center toward `point` leaves the node's box.
fn intersect_rect(node: &WorkNode, point: Point) -> Point {
    let (x, y) = (node.x, node.y);
    let dx = point.x - x;
    let dy = point.y - y;
    let mut w = node.width / 2.0;
    let mut h = node.height / 2.0;
    if (dx == 0.0 && dy == 0.0) || (w == 0.0 && h == 0.0) {
        return Point { x, y };
    }

    let (sx, sy) = if dx == 0.0 || dy.abs() * w > dx.abs() * h {
        if dy < 0.0 {
            h = -h;
        }
        (h * dx / dy, h)
    } else {
        if dx < 0.0 {
            w = -w;
        }
        (w, w * dy / dx)
    };
    Point {
        x: x + sx,
        y: y + sy,
    }
}
