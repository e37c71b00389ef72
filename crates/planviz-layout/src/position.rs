//! Coordinate assignment.
//!
//! `y` comes from stacking ranks, leaving room for the padding and label band of the clusters
//! that open or close between two ranks. `x` is solved over blocks: each cluster side (its border
//! nodes on every rank) is one block, every other node is a block of its own. Consecutive nodes
//! on a rank give minimum-distance constraints between blocks. The left-most packing is then
//! relaxed towards the barycenter of each node's neighbors, with cluster sides released before
//! and pulled tight after every pass.

use crate::GraphLabel;
use crate::layering::{BandSide, Bounds, Kind, Layering, WorkCluster};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

const RELAX_PASSES: usize = 12;

pub(crate) fn run(work: &mut Layering, graph: &GraphLabel) {
    assign_y(work, graph);
    assign_x(work, graph);
    cluster_bounds(work, graph);
}

fn assign_y(work: &mut Layering, graph: &GraphLabel) {
    let pad = graph.cluster_padding;
    let heights: Vec<f64> = work
        .layers
        .iter()
        .map(|layer| {
            layer
                .iter()
                .map(|&v| work.nodes[v].height)
                .fold(0.0_f64, f64::max)
        })
        .collect();

    // Extra room below rank `r` for clusters ending there, and above it for clusters starting
    // there.
    let mut closing = vec![0.0_f64; work.layers.len()];
    let mut opening = vec![0.0_f64; work.layers.len()];
    for (r, layer) in work.layers.iter().enumerate() {
        for &v in layer {
            let mut close = 0.0;
            let mut open = 0.0;
            for &c in &work.nodes[v].path {
                let cluster = &work.clusters[c];
                if cluster.max_rank == r {
                    close += pad + band(cluster, BandSide::Bottom);
                }
                if cluster.min_rank == r {
                    open += pad + band(cluster, BandSide::Top);
                }
            }
            closing[r] = closing[r].max(close);
            opening[r] = opening[r].max(open);
        }
    }

    let mut centers = stack(&heights, &closing, &opening, graph.ranksep);

    // Clusters shorter than their minimum length along the rank axis are grown evenly on both
    // ends in `cluster_bounds`; make room for that before and after their outer ranks.
    let mut grown = false;
    for (c, cluster) in work.clusters.iter().enumerate() {
        if cluster.min_length <= 0.0 || cluster.left.is_empty() {
            continue;
        }
        let (top, bottom) = work
            .nodes
            .iter()
            .filter(|n| !n.is_border() && n.is_inside(c))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(t, b), n| {
                let y = centers[n.rank];
                (t.min(y - n.height / 2.0), b.max(y + n.height / 2.0))
            });
        if !top.is_finite() {
            continue;
        }
        let extent = bottom - top
            + 2.0 * pad
            + band(cluster, BandSide::Top)
            + band(cluster, BandSide::Bottom);
        let short = cluster.min_length - extent;
        if short > 0.0 {
            opening[cluster.min_rank] += short / 2.0;
            closing[cluster.max_rank] += short / 2.0;
            grown = true;
        }
    }
    if grown {
        centers = stack(&heights, &closing, &opening, graph.ranksep);
    }

    for node in &mut work.nodes {
        node.y = centers[node.rank];
    }
}

/// Rank centers, first rank at half its height.
fn stack(heights: &[f64], closing: &[f64], opening: &[f64], ranksep: f64) -> Vec<f64> {
    let mut centers = Vec::with_capacity(heights.len());
    let mut y = heights.first().copied().unwrap_or(0.0) / 2.0;
    for r in 0..heights.len() {
        if r > 0 {
            y += heights[r - 1] / 2.0 + ranksep + closing[r - 1] + opening[r] + heights[r] / 2.0;
        }
        centers.push(y);
    }
    centers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Single(usize),
    Left,
    Right,
}

struct Blocks {
    kind: Vec<BlockKind>,
    of_node: Vec<usize>,
    preds: Vec<Vec<(usize, f64)>>,
    succs: Vec<Vec<(usize, f64)>>,
}

impl Blocks {
    fn build(work: &Layering, graph: &GraphLabel) -> Self {
        let mut kind: Vec<BlockKind> = Vec::new();
        let mut of_node = vec![usize::MAX; work.nodes.len()];
        for cluster in &work.clusters {
            for (side, members) in [(BlockKind::Left, &cluster.left), (BlockKind::Right, &cluster.right)] {
                if members.is_empty() {
                    continue;
                }
                let b = kind.len();
                kind.push(side);
                for &v in members {
                    of_node[v] = b;
                }
            }
        }
        for (v, slot) in of_node.iter_mut().enumerate() {
            if *slot == usize::MAX {
                *slot = kind.len();
                kind.push(BlockKind::Single(v));
            }
        }

        let mut gaps: FxHashMap<(usize, usize), f64> = FxHashMap::default();
        let mut require = |a: usize, b: usize, d: f64| {
            if a == b {
                return;
            }
            let entry = gaps.entry((a, b)).or_insert(d);
            *entry = entry.max(d);
        };
        for layer in &work.layers {
            for pair in layer.windows(2) {
                let (u, v) = (pair[0], pair[1]);
                let d = (work.nodes[u].width + work.nodes[v].width) / 2.0
                    + separation(work, graph, u, v);
                require(of_node[u], of_node[v], d);
            }
        }
        for cluster in &work.clusters {
            if let (Some(&l), Some(&r)) = (cluster.left.first(), cluster.right.first()) {
                require(of_node[l], of_node[r], cluster.min_width);
            }
        }

        let mut preds = vec![Vec::new(); kind.len()];
        let mut succs = vec![Vec::new(); kind.len()];
        let mut gaps: Vec<((usize, usize), f64)> = gaps.into_iter().collect();
        gaps.sort_by_key(|&(pair, _)| pair);
        for ((a, b), d) in gaps {
            succs[a].push((b, d));
            preds[b].push((a, d));
        }

        Self {
            kind,
            of_node,
            preds,
            succs,
        }
    }

    /// Kahn order over the constraint graph. A cycle (inconsistent ordering) is broken by
    /// appending the remaining blocks in index order.
    fn topological(&self) -> Vec<usize> {
        let mut indegree: Vec<usize> = self.preds.iter().map(Vec::len).collect();
        let mut queue: VecDeque<usize> = (0..self.kind.len()).filter(|&b| indegree[b] == 0).collect();
        let mut order = Vec::with_capacity(self.kind.len());
        let mut seen = vec![false; self.kind.len()];
        while let Some(b) = queue.pop_front() {
            order.push(b);
            seen[b] = true;
            for &(c, _) in &self.succs[b] {
                indegree[c] -= 1;
                if indegree[c] == 0 {
                    queue.push_back(c);
                }
            }
        }
        if order.len() < self.kind.len() {
            tracing::warn!(
                blocks = self.kind.len() - order.len(),
                "cyclic separation constraints; positions may overlap"
            );
            order.extend((0..self.kind.len()).filter(|&b| !seen[b]));
        }
        order
    }

    fn lower(&self, x: &[f64], b: usize) -> f64 {
        self.preds[b]
            .iter()
            .map(|&(a, d)| x[a] + d)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    fn upper(&self, x: &[f64], b: usize) -> f64 {
        self.succs[b]
            .iter()
            .map(|&(c, d)| x[c] - d)
            .fold(f64::INFINITY, f64::min)
    }
}

/// Label band of `cluster` if it lies on `side`, else zero.
fn band(cluster: &WorkCluster, side: BandSide) -> f64 {
    if cluster.band_side == side {
        cluster.label_band
    } else {
        0.0
    }
}

/// Minimum free space between two neighbors on a rank.
fn separation(work: &Layering, graph: &GraphLabel, u: usize, v: usize) -> f64 {
    let (nu, nv) = (&work.nodes[u], &work.nodes[v]);
    if let (Kind::BorderLeft, Some(c)) = (nu.kind, nu.cluster) {
        if nv.is_inside(c) {
            return graph.cluster_padding + band(&work.clusters[c], BandSide::Left);
        }
    }
    if let (Kind::BorderRight, Some(c)) = (nv.kind, nv.cluster) {
        if nu.is_inside(c) {
            return graph.cluster_padding;
        }
    }
    match (nu.kind == Kind::Dummy, nv.kind == Kind::Dummy) {
        (false, false) => graph.nodesep,
        (true, true) => graph.edgesep,
        _ => (graph.nodesep + graph.edgesep) / 2.0,
    }
}

fn assign_x(work: &mut Layering, graph: &GraphLabel) {
    let blocks = Blocks::build(work, graph);
    let order = blocks.topological();
    let n = blocks.kind.len();

    let mut x = vec![0.0_f64; n];
    for &b in &order {
        let lo = blocks.lower(&x, b);
        x[b] = if lo.is_finite() { lo } else { 0.0 };
    }

    // Bound for released cluster sides, larger than any drawing extent.
    let reach: f64 = work.nodes.iter().map(|n| n.width).sum::<f64>()
        + (graph.nodesep + 2.0 * graph.cluster_padding) * work.nodes.len() as f64
        + work.clusters.iter().map(|c| c.min_width).sum::<f64>();

    let mut sides_forward: Vec<usize> = Vec::new();
    for &b in &order {
        if matches!(blocks.kind[b], BlockKind::Left | BlockKind::Right) {
            sides_forward.push(b);
        }
    }

    for pass in 0..RELAX_PASSES {
        // Release: left sides as far left, right sides as far right as allowed.
        for &b in &sides_forward {
            if blocks.kind[b] == BlockKind::Left {
                let lo = blocks.lower(&x, b);
                x[b] = if lo.is_finite() { lo } else { x[b] - reach };
            }
        }
        for &b in sides_forward.iter().rev() {
            if blocks.kind[b] == BlockKind::Right {
                let hi = blocks.upper(&x, b);
                x[b] = if hi.is_finite() { hi } else { x[b] + reach };
            }
        }

        let forward = pass % 2 == 0;
        let visit = |b: usize, x: &mut Vec<f64>| {
            let BlockKind::Single(v) = blocks.kind[b] else {
                return;
            };
            let node = &work.nodes[v];
            let neighbors = node.up.iter().chain(&node.down);
            let (sum, count) = neighbors.fold((0.0, 0usize), |(s, c), &u| {
                (s + x[blocks.of_node[u]], c + 1)
            });
            if count == 0 {
                return;
            }
            let target = sum / count as f64;
            x[b] = clamp(target, blocks.lower(x, b), blocks.upper(x, b));
        };
        if forward {
            for &b in &order {
                visit(b, &mut x);
            }
        } else {
            for &b in order.iter().rev() {
                visit(b, &mut x);
            }
        }

        // Tighten: sides hug their content again, innermost first.
        for &b in sides_forward.iter().rev() {
            if blocks.kind[b] == BlockKind::Left {
                let hi = blocks.upper(&x, b);
                if hi.is_finite() {
                    x[b] = hi.max(blocks.lower(&x, b));
                }
            }
        }
        for &b in &sides_forward {
            if blocks.kind[b] == BlockKind::Right {
                let lo = blocks.lower(&x, b);
                if lo.is_finite() {
                    x[b] = lo.min(blocks.upper(&x, b));
                }
            }
        }
    }

    for (v, node) in work.nodes.iter_mut().enumerate() {
        node.x = x[blocks.of_node[v]];
    }
}

/// Clamps into `[lo, hi]`; an empty interval resolves to `lo`.
fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value > hi {
        return hi.max(lo);
    }
    value.max(lo)
}

/// Cluster boxes, innermost first. Sides come from the border blocks; top and bottom enclose
/// the direct members and child boxes plus padding, with the label band on top.
fn cluster_bounds(work: &mut Layering, graph: &GraphLabel) {
    let pad = graph.cluster_padding;
    let mut by_depth: Vec<usize> = (0..work.clusters.len()).collect();
    by_depth.sort_by_key(|&c| std::cmp::Reverse(work.clusters[c].depth));

    for c in by_depth {
        let cluster = &work.clusters[c];
        let (Some(&l), Some(&r)) = (cluster.left.first(), cluster.right.first()) else {
            continue;
        };
        let mut top = f64::INFINITY;
        let mut bottom = f64::NEG_INFINITY;
        for node in &work.nodes {
            if node.cluster == Some(c) && !node.is_border() {
                top = top.min(node.y - node.height / 2.0);
                bottom = bottom.max(node.y + node.height / 2.0);
            }
        }
        for child in &work.clusters {
            if child.parent == Some(c) && !child.left.is_empty() {
                top = top.min(child.bounds.top);
                bottom = bottom.max(child.bounds.bottom);
            }
        }
        if !top.is_finite() {
            continue;
        }
        let mut bounds = Bounds {
            left: work.nodes[l].x,
            right: work.nodes[r].x,
            top: top - pad - band(cluster, BandSide::Top),
            bottom: bottom + pad + band(cluster, BandSide::Bottom),
        };
        let short = cluster.min_length - (bounds.bottom - bounds.top);
        if short > 0.0 {
            bounds.top -= short / 2.0;
            bounds.bottom += short / 2.0;
        }
        work.clusters[c].bounds = bounds;
    }
}
