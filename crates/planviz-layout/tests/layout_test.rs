use planviz_layout::{
    EdgeLabel, Graph, GraphLabel, GraphOptions, LayoutGraph, NodeLabel, Point, RankDir, layout,
};

fn graph() -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        multigraph: true,
        compound: true,
    });
    g.set_graph(GraphLabel::default());
    g
}

fn node(width: f64, height: f64) -> NodeLabel {
    NodeLabel {
        width,
        height,
        ..Default::default()
    }
}

fn center(g: &LayoutGraph, id: &str) -> (f64, f64) {
    let n = g.node(id).unwrap();
    (n.x.unwrap(), n.y.unwrap())
}

fn points(g: &LayoutGraph, v: &str, w: &str) -> Vec<Point> {
    g.edge(v, w, None).unwrap().points.clone()
}

fn on_border(g: &LayoutGraph, id: &str, p: Point) -> bool {
    let n = g.node(id).unwrap();
    let (x, y) = (n.x.unwrap(), n.y.unwrap());
    let dx = (p.x - x).abs();
    let dy = (p.y - y).abs();
    let eps = 1e-6;
    dx <= n.width / 2.0 + eps
        && dy <= n.height / 2.0 + eps
        && ((n.width / 2.0 - dx).abs() < eps || (n.height / 2.0 - dy).abs() < eps)
}

#[test]
fn lays_out_a_single_node() {
    let mut g = graph();
    g.set_node("a", node(50.0, 100.0));
    layout(&mut g);
    assert_eq!(center(&g, "a"), (25.0, 50.0));
    assert_eq!(g.graph().width, 50.0);
    assert_eq!(g.graph().height, 100.0);
}

#[test]
fn lays_out_two_nodes_on_the_same_rank() {
    let mut g = graph();
    g.graph_mut().nodesep = 200.0;
    g.set_node("a", node(50.0, 100.0));
    g.set_node("b", node(75.0, 200.0));
    layout(&mut g);
    assert_eq!(center(&g, "a"), (25.0, 100.0));
    assert_eq!(center(&g, "b"), (50.0 + 200.0 + 75.0 / 2.0, 100.0));
}

#[test]
fn lays_out_two_connected_nodes() {
    let mut g = graph();
    g.graph_mut().ranksep = 300.0;
    g.set_node("a", node(50.0, 100.0));
    g.set_node("b", node(75.0, 200.0));
    g.set_edge_with_label("a", "b", EdgeLabel::default());
    layout(&mut g);
    assert_eq!(center(&g, "a"), (37.5, 50.0));
    assert_eq!(center(&g, "b"), (37.5, 100.0 + 300.0 + 100.0));

    let pts = points(&g, "a", "b");
    assert_eq!(pts.len(), 3);
    assert_eq!(pts[0], Point { x: 37.5, y: 100.0 });
    assert_eq!(pts[1], Point { x: 37.5, y: 250.0 });
    assert_eq!(pts[2], Point { x: 37.5, y: 400.0 });
}

#[test]
fn margins_shift_the_drawing() {
    let mut g = graph();
    g.graph_mut().marginx = 16.0;
    g.graph_mut().marginy = 8.0;
    g.set_node("a", node(50.0, 100.0));
    layout(&mut g);
    assert_eq!(center(&g, "a"), (16.0 + 25.0, 8.0 + 50.0));
    assert_eq!(g.graph().width, 50.0 + 32.0);
    assert_eq!(g.graph().height, 100.0 + 16.0);
}

#[test]
fn long_edges_bend_once_per_intermediate_rank() {
    let mut g = graph();
    for id in ["a", "b", "c", "d"] {
        g.set_node(id, node(40.0, 20.0));
    }
    g.set_edge("a", "b");
    g.set_edge("b", "c");
    g.set_edge("c", "d");
    g.set_edge("a", "d");
    layout(&mut g);

    let long = points(&g, "a", "d");
    assert_eq!(long.len(), 4);
    assert!(on_border(&g, "a", long[0]));
    assert!(on_border(&g, "d", long[3]));
    let ranks: Vec<usize> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| g.node(id).unwrap().rank.unwrap())
        .collect();
    assert_eq!(ranks, vec![0, 1, 2, 3]);
}

#[test]
fn cycles_are_laid_out_with_original_directions() {
    let mut g = graph();
    g.set_node("a", node(40.0, 20.0));
    g.set_node("b", node(40.0, 20.0));
    g.set_edge("a", "b");
    g.set_edge("b", "a");
    layout(&mut g);

    let forward = points(&g, "a", "b");
    let back = points(&g, "b", "a");
    assert!(on_border(&g, "a", forward[0]));
    assert!(on_border(&g, "b", *forward.last().unwrap()));
    assert!(on_border(&g, "b", back[0]));
    assert!(on_border(&g, "a", *back.last().unwrap()));
}

#[test]
fn cluster_box_encloses_members_with_padding() {
    let mut g = graph();
    g.set_node("a", node(50.0, 20.0));
    g.set_node("b", node(50.0, 20.0));
    g.set_node("c", NodeLabel::default());
    g.set_parent("a", "c");
    g.set_parent("b", "c");
    g.set_edge("a", "b");
    layout(&mut g);

    assert_eq!(center(&g, "a"), (35.0, 20.0));
    assert_eq!(center(&g, "b"), (35.0, 90.0));
    let c = g.node("c").unwrap();
    assert_eq!((c.x.unwrap(), c.y.unwrap()), (35.0, 55.0));
    assert_eq!((c.width, c.height), (70.0, 110.0));
}

#[test]
fn cluster_label_band_and_min_width_are_reserved() {
    let mut g = graph();
    g.set_node("a", node(50.0, 20.0));
    g.set_node(
        "c",
        NodeLabel {
            width: 200.0,
            label_band: 30.0,
            ..Default::default()
        },
    );
    g.set_parent("a", "c");
    layout(&mut g);

    let c = g.node("c").unwrap();
    let (ax, ay) = center(&g, "a");
    assert!(c.width >= 200.0);
    let top = c.y.unwrap() - c.height / 2.0;
    assert!((ay - 10.0 - top - 10.0 - 30.0).abs() < 1e-9);
    assert!(ax - 25.0 >= c.x.unwrap() - c.width / 2.0 + 10.0 - 1e-9);
}

#[test]
fn cluster_label_band_stays_on_top_for_every_rank_direction() {
    for rankdir in [RankDir::TB, RankDir::BT, RankDir::LR, RankDir::RL] {
        let mut g = graph();
        g.graph_mut().rankdir = rankdir;
        g.set_node("a", node(50.0, 20.0));
        g.set_node("b", node(50.0, 20.0));
        g.set_node(
            "c",
            NodeLabel {
                width: 200.0,
                label_band: 30.0,
                ..Default::default()
            },
        );
        g.set_parent("a", "c");
        g.set_edge("a", "b");
        layout(&mut g);

        let c = g.node("c").unwrap();
        let (cx, cy) = (c.x.unwrap(), c.y.unwrap());
        let (ax, ay) = center(&g, "a");
        let (bx, by) = center(&g, "b");
        assert!(c.width >= 200.0 - 1e-9, "{rankdir:?}: width {}", c.width);
        assert!(
            ay - 10.0 >= cy - c.height / 2.0 + 10.0 + 30.0 - 1e-9,
            "{rankdir:?}: band overlaps a"
        );
        assert!(ax - 25.0 >= cx - c.width / 2.0 - 1e-9);
        assert!(ax + 25.0 <= cx + c.width / 2.0 + 1e-9);

        let outside_x = bx + 25.0 <= cx - c.width / 2.0 + 1e-9
            || bx - 25.0 >= cx + c.width / 2.0 - 1e-9;
        let outside_y = by + 10.0 <= cy - c.height / 2.0 + 1e-9
            || by - 10.0 >= cy + c.height / 2.0 - 1e-9;
        assert!(outside_x || outside_y, "{rankdir:?}: b inside the cluster box");
    }
}

#[test]
fn left_to_right_puts_ranks_on_the_x_axis() {
    let mut g = graph();
    g.graph_mut().rankdir = RankDir::LR;
    g.set_node("a", node(40.0, 20.0));
    g.set_node("b", node(40.0, 20.0));
    g.set_edge("a", "b");
    layout(&mut g);

    let (ax, ay) = center(&g, "a");
    let (bx, by) = center(&g, "b");
    assert!(ax < bx);
    assert_eq!(ay, by);
    assert_eq!(g.node("a").unwrap().width, 40.0);
    assert_eq!(bx - ax, 40.0 + 50.0);
}

#[test]
fn bottom_to_top_flips_ranks() {
    let mut g = graph();
    g.graph_mut().rankdir = RankDir::BT;
    g.set_node("a", node(40.0, 20.0));
    g.set_node("b", node(40.0, 20.0));
    g.set_edge("a", "b");
    layout(&mut g);
    assert!(center(&g, "a").1 > center(&g, "b").1);
}

#[test]
fn edges_into_clusters_are_ignored() {
    let mut g = graph();
    g.set_node("a", node(40.0, 20.0));
    g.set_node("x", node(40.0, 20.0));
    g.set_parent("x", "c");
    g.set_edge("a", "c");
    layout(&mut g);
    assert!(points(&g, "a", "c").is_empty());
    assert!(g.node("a").unwrap().x.is_some());
}

#[test]
fn empty_graph_only_has_margins() {
    let mut g = graph();
    g.graph_mut().marginx = 5.0;
    g.graph_mut().marginy = 7.0;
    layout(&mut g);
    assert_eq!((g.graph().width, g.graph().height), (10.0, 14.0));
}
