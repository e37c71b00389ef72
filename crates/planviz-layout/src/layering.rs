//! Dense working representation shared by the ordering and positioning phases.
//!
//! Leaves keep their graph insertion index. Long edges are split into chains of zero-size dummy
//! nodes (one per intermediate rank), and every cluster gets a left and a right border node on
//! each rank it spans so that ordering and positioning see the cluster even on ranks where it
//! has no leaf.

use crate::graph::EdgeKey;
use crate::{LayoutGraph, RankDir, acyclic, rank};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Leaf,
    Dummy,
    BorderLeft,
    BorderRight,
}

#[derive(Debug, Clone)]
pub(crate) struct WorkNode {
    /// Graph id, for leaves only.
    pub(crate) id: Option<String>,
    pub(crate) kind: Kind,
    /// Innermost cluster; for border nodes, the cluster they delimit.
    pub(crate) cluster: Option<usize>,
    /// Clusters containing this node, outermost first.
    pub(crate) path: Vec<usize>,
    pub(crate) rank: usize,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) x: f64,
    pub(crate) y: f64,
    /// Neighbors on the previous and the next rank.
    pub(crate) up: Vec<usize>,
    pub(crate) down: Vec<usize>,
}

impl WorkNode {
    pub(crate) fn is_border(&self) -> bool {
        matches!(self.kind, Kind::BorderLeft | Kind::BorderRight)
    }

    pub(crate) fn is_inside(&self, cluster: usize) -> bool {
        self.path.contains(&cluster)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Bounds {
    pub(crate) left: f64,
    pub(crate) right: f64,
    pub(crate) top: f64,
    pub(crate) bottom: f64,
}

/// Side of a cluster box, in working coordinates, that ends up on top of the final drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BandSide {
    Top,
    Bottom,
    Left,
}

impl BandSide {
    fn for_rankdir(rankdir: RankDir) -> Self {
        match rankdir {
            RankDir::TB => Self::Top,
            RankDir::BT => Self::Bottom,
            RankDir::LR | RankDir::RL => Self::Left,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct WorkCluster {
    pub(crate) id: String,
    pub(crate) parent: Option<usize>,
    pub(crate) depth: usize,
    pub(crate) min_rank: usize,
    pub(crate) max_rank: usize,
    /// Minimum box extent across ranks and along the rank axis.
    pub(crate) min_width: f64,
    pub(crate) min_length: f64,
    pub(crate) label_band: f64,
    pub(crate) band_side: BandSide,
    /// Border nodes, indexed by `rank - min_rank`.
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
    pub(crate) bounds: Bounds,
}

#[derive(Debug, Clone)]
pub(crate) struct WorkEdge {
    pub(crate) key: EdgeKey,
    /// Node chain in rank order (reversed edges run target to source).
    pub(crate) chain: Vec<usize>,
    pub(crate) reversed: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Layering {
    pub(crate) nodes: Vec<WorkNode>,
    pub(crate) clusters: Vec<WorkCluster>,
    pub(crate) edges: Vec<WorkEdge>,
    /// Self-loops, routed around their node.
    pub(crate) loops: Vec<(EdgeKey, usize)>,
    pub(crate) layers: Vec<Vec<usize>>,
}

impl Layering {
    pub(crate) fn build(g: &LayoutGraph) -> Self {
        let mut work = Layering::default();
        let band_side = BandSide::for_rankdir(g.graph().rankdir);

        let mut cluster_index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut leaf_index: FxHashMap<&str, usize> = FxHashMap::default();
        for id in g.nodes() {
            if g.is_cluster(id) {
                cluster_index.insert(id, cluster_index.len());
            }
        }
        for id in g.nodes() {
            if let Some(&c) = cluster_index.get(id) {
                let label = g.node(id).cloned().unwrap_or_default();
                work.clusters.push(WorkCluster {
                    id: id.to_string(),
                    parent: g.parent(id).and_then(|p| cluster_index.get(p).copied()),
                    depth: 0,
                    min_rank: usize::MAX,
                    max_rank: 0,
                    min_width: label.width,
                    min_length: label.height,
                    label_band: label.label_band,
                    band_side,
                    left: Vec::new(),
                    right: Vec::new(),
                    bounds: Bounds::default(),
                });
                debug_assert_eq!(c + 1, work.clusters.len());
            }
        }
        for c in 0..work.clusters.len() {
            let depth = work.cluster_path(Some(c)).len() - 1;
            work.clusters[c].depth = depth;
        }

        for id in g.nodes() {
            if cluster_index.contains_key(id) {
                continue;
            }
            let label = g.node(id).cloned().unwrap_or_default();
            let cluster = g.parent(id).and_then(|p| cluster_index.get(p).copied());
            let path = work.cluster_path(cluster);
            leaf_index.insert(id, work.nodes.len());
            work.nodes.push(WorkNode {
                id: Some(id.to_string()),
                kind: Kind::Leaf,
                cluster,
                path,
                rank: 0,
                width: label.width,
                height: label.height,
                x: 0.0,
                y: 0.0,
                up: Vec::new(),
                down: Vec::new(),
            });
        }
        let leaf_count = work.nodes.len();

        // Only leaf-to-leaf edges take part in the layout.
        let mut keys: Vec<(EdgeKey, usize, usize, usize)> = Vec::new();
        for key in g.edges() {
            let (Some(&v), Some(&w)) = (
                leaf_index.get(key.v.as_str()),
                leaf_index.get(key.w.as_str()),
            ) else {
                tracing::debug!(source = %key.v, target = %key.w, "skipping edge attached to a cluster");
                continue;
            };
            if v == w {
                work.loops.push((key.clone(), v));
                continue;
            }
            let minlen = g.edge_by_key(key).map(|e| e.minlen).unwrap_or(1);
            keys.push((key.clone(), v, w, minlen));
        }

        let pairs: Vec<(usize, usize)> = keys.iter().map(|&(_, v, w, _)| (v, w)).collect();
        let reversed = acyclic::back_edges(leaf_count, &pairs);
        let oriented: Vec<(usize, usize, usize)> = keys
            .iter()
            .zip(&reversed)
            .map(|(&(_, v, w, minlen), &rev)| if rev { (w, v, minlen) } else { (v, w, minlen) })
            .collect();
        let ranks = rank::longest_path(leaf_count, &oriented);
        for (node, &r) in work.nodes.iter_mut().zip(&ranks) {
            node.rank = r;
        }

        for leaf in 0..leaf_count {
            let r = work.nodes[leaf].rank;
            for &c in &work.nodes[leaf].path {
                let cluster = &mut work.clusters[c];
                cluster.min_rank = cluster.min_rank.min(r);
                cluster.max_rank = cluster.max_rank.max(r);
            }
        }

        for ((key, ..), (&(v, w, _), &rev)) in keys.into_iter().zip(oriented.iter().zip(&reversed)) {
            let chain = work.add_chain(v, w);
            work.edges.push(WorkEdge {
                key,
                chain,
                reversed: rev,
            });
        }

        work.add_borders();

        let max_rank = work.nodes.iter().map(|n| n.rank).max().unwrap_or(0);
        work.layers = vec![Vec::new(); if work.nodes.is_empty() { 0 } else { max_rank + 1 }];
        for (idx, node) in work.nodes.iter().enumerate() {
            work.layers[node.rank].push(idx);
        }

        tracing::debug!(
            leaves = leaf_count,
            dummies = work.nodes.iter().filter(|n| n.kind == Kind::Dummy).count(),
            clusters = work.clusters.len(),
            reversed = reversed.iter().filter(|r| **r).count(),
            "built layering"
        );
        work
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `cluster` and its ancestors, outermost first.
    pub(crate) fn cluster_path(&self, cluster: Option<usize>) -> Vec<usize> {
        let mut path = Vec::new();
        let mut cur = cluster;
        while let Some(c) = cur {
            if path.contains(&c) {
                break;
            }
            path.push(c);
            cur = self.clusters[c].parent;
        }
        path.reverse();
        path
    }

    /// Deepest cluster containing both nodes.
    fn common_cluster(&self, v: usize, w: usize) -> Option<usize> {
        self.nodes[v]
            .path
            .iter()
            .zip(&self.nodes[w].path)
            .take_while(|(a, b)| a == b)
            .last()
            .map(|(a, _)| *a)
    }

    fn push_node(&mut self, node: WorkNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn link(&mut self, upper: usize, lower: usize) {
        self.nodes[upper].down.push(lower);
        self.nodes[lower].up.push(upper);
    }

    fn add_chain(&mut self, v: usize, w: usize) -> Vec<usize> {
        let cluster = self.common_cluster(v, w);
        let path = self.cluster_path(cluster);
        let mut chain = vec![v];
        for r in self.nodes[v].rank + 1..self.nodes[w].rank {
            let dummy = self.push_node(WorkNode {
                id: None,
                kind: Kind::Dummy,
                cluster,
                path: path.clone(),
                rank: r,
                width: 0.0,
                height: 0.0,
                x: 0.0,
                y: 0.0,
                up: Vec::new(),
                down: Vec::new(),
            });
            chain.push(dummy);
        }
        chain.push(w);
        for pair in chain.windows(2) {
            self.link(pair[0], pair[1]);
        }
        chain
    }

    fn add_borders(&mut self) {
        for c in 0..self.clusters.len() {
            let (min_rank, max_rank) = (self.clusters[c].min_rank, self.clusters[c].max_rank);
            if min_rank > max_rank {
                continue;
            }
            let path = self.cluster_path(Some(c));
            for kind in [Kind::BorderLeft, Kind::BorderRight] {
                let mut prev: Option<usize> = None;
                for r in min_rank..=max_rank {
                    let border = self.push_node(WorkNode {
                        id: None,
                        kind,
                        cluster: Some(c),
                        path: path.clone(),
                        rank: r,
                        width: 0.0,
                        height: 0.0,
                        x: 0.0,
                        y: 0.0,
                        up: Vec::new(),
                        down: Vec::new(),
                    });
                    if let Some(prev) = prev {
                        self.link(prev, border);
                    }
                    prev = Some(border);
                    match kind {
                        Kind::BorderLeft => self.clusters[c].left.push(border),
                        _ => self.clusters[c].right.push(border),
                    }
                }
            }
        }
    }

    /// Copies leaf positions and cluster boxes back onto the graph labels.
    pub(crate) fn write_back(&self, g: &mut LayoutGraph) {
        for (order_in_layer, node) in self.layer_positions() {
            let node = &self.nodes[node];
            let Some(id) = &node.id else {
                continue;
            };
            if let Some(label) = g.node_mut(id) {
                label.x = Some(node.x);
                label.y = Some(node.y);
                label.rank = Some(node.rank);
                label.order = Some(order_in_layer);
            }
        }
        for cluster in &self.clusters {
            if let Some(label) = g.node_mut(&cluster.id) {
                let b = cluster.bounds;
                label.x = Some((b.left + b.right) / 2.0);
                label.y = Some((b.top + b.bottom) / 2.0);
                label.width = b.right - b.left;
                label.height = b.bottom - b.top;
                label.rank = None;
                label.order = None;
            }
        }
    }

    /// `(index within layer, node)` for every node.
    pub(crate) fn layer_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.layers
            .iter()
            .flat_map(|layer| layer.iter().copied().enumerate())
    }
}
