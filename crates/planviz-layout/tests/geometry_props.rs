use planviz_layout::{Graph, GraphLabel, GraphOptions, LayoutGraph, NodeLabel, layout};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Rect {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Rect {
    fn of(g: &LayoutGraph, id: &str) -> Rect {
        let n = g.node(id).unwrap();
        let (x, y) = (n.x.unwrap(), n.y.unwrap());
        Rect {
            left: x - n.width / 2.0,
            right: x + n.width / 2.0,
            top: y - n.height / 2.0,
            bottom: y + n.height / 2.0,
        }
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right - EPS
            && other.left < self.right - EPS
            && self.top < other.bottom - EPS
            && other.top < self.bottom - EPS
    }

    fn contains(&self, inner: &Rect, pad: f64) -> bool {
        self.left <= inner.left - pad + EPS
            && self.right >= inner.right + pad - EPS
            && self.top <= inner.top - pad + EPS
            && self.bottom >= inner.bottom + pad - EPS
    }
}

type Plan = (Vec<(f64, f64, Option<u8>)>, Vec<(usize, usize)>);

fn arb_plan() -> impl Strategy<Value = Plan> {
    (2usize..10).prop_flat_map(|n| {
        let nodes = prop::collection::vec(
            (10.0f64..80.0, 10.0f64..40.0, prop::option::of(0u8..3)),
            n,
        );
        let edges = prop::collection::vec((0..n, 0..n), 0..2 * n);
        (nodes, edges)
    })
}

/// Clusters `c0` and `c1` are top-level siblings; `c2` nests inside `c0`.
fn build((nodes, edges): &Plan) -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        multigraph: true,
        compound: true,
    });
    g.set_graph(GraphLabel::default());
    for (i, &(width, height, cluster)) in nodes.iter().enumerate() {
        let id = format!("n{i}");
        g.set_node(
            id.clone(),
            NodeLabel {
                width,
                height,
                ..Default::default()
            },
        );
        if let Some(c) = cluster {
            g.set_parent(id, format!("c{c}"));
        }
    }
    if g.has_node("c2") {
        g.set_parent("c2", "c0");
    }
    for (i, &(v, w)) in edges.iter().enumerate() {
        if v != w {
            g.set_edge_named(format!("n{v}"), format!("n{w}"), Some(format!("e{i}")), None);
        }
    }
    g
}

fn cluster_chain(cluster: Option<u8>) -> Vec<String> {
    match cluster {
        None => Vec::new(),
        Some(2) => vec!["c2".to_string(), "c0".to_string()],
        Some(c) => vec![format!("c{c}")],
    }
}

proptest! {
    #[test]
    fn leaves_sit_inside_their_clusters(plan in arb_plan()) {
        let mut g = build(&plan);
        layout(&mut g);
        let pad = g.graph().cluster_padding;
        for (i, &(_, _, cluster)) in plan.0.iter().enumerate() {
            let leaf = Rect::of(&g, &format!("n{i}"));
            prop_assert!(leaf.left.is_finite() && leaf.top.is_finite());
            for c in cluster_chain(cluster) {
                let outer = Rect::of(&g, &c);
                prop_assert!(outer.contains(&leaf, pad), "n{} escapes {}", i, c);
            }
        }
    }

    #[test]
    fn clusters_do_not_overlap_foreign_nodes(plan in arb_plan()) {
        let mut g = build(&plan);
        layout(&mut g);
        let clusters: Vec<String> = ["c0", "c1", "c2"]
            .iter()
            .filter(|c| g.is_cluster(c))
            .map(|c| c.to_string())
            .collect();
        for (i, &(_, _, cluster)) in plan.0.iter().enumerate() {
            let chain = cluster_chain(cluster);
            let leaf = Rect::of(&g, &format!("n{i}"));
            for c in &clusters {
                if !chain.contains(c) {
                    prop_assert!(!Rect::of(&g, c).overlaps(&leaf), "n{} overlaps {}", i, c);
                }
            }
        }
        if g.is_cluster("c0") && g.is_cluster("c1") {
            prop_assert!(!Rect::of(&g, "c0").overlaps(&Rect::of(&g, "c1")));
        }
        if g.is_cluster("c2") && g.is_cluster("c1") {
            prop_assert!(!Rect::of(&g, "c2").overlaps(&Rect::of(&g, "c1")));
        }
    }

    #[test]
    fn leaves_on_a_rank_do_not_overlap(plan in arb_plan()) {
        let mut g = build(&plan);
        layout(&mut g);
        let n = plan.0.len();
        for i in 0..n {
            for j in i + 1..n {
                let (a, b) = (format!("n{i}"), format!("n{j}"));
                if g.node(&a).unwrap().rank == g.node(&b).unwrap().rank {
                    prop_assert!(!Rect::of(&g, &a).overlaps(&Rect::of(&g, &b)));
                }
            }
        }
    }

    #[test]
    fn layout_is_deterministic(plan in arb_plan()) {
        let mut a = build(&plan);
        let mut b = build(&plan);
        layout(&mut a);
        layout(&mut b);
        for id in a.node_ids() {
            prop_assert_eq!(a.node(&id), b.node(&id));
        }
    }
}
