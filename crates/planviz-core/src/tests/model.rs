use crate::{LabelKind, parse_plan_graph};

const NESTED: &str = r#"digraph G {
  subgraph cluster0 {
    isCluster="true";
    label="WholeStageCodegen (1)";
    name="PhotonShuffleExchange";
    subgraph cluster1 {
      label="Inner";
      2 [labelType="html" label="<b>Project</b>" name="PhotonProject"];
    }
    1 [labelType="html" label="<b>Filter</b>"];
  }
  0 [label="Scan"];
  0->1;
  1->2;
}"#;

#[test]
fn builds_nested_clusters_and_memberships() {
    let g = parse_plan_graph(NESTED).unwrap();
    assert_eq!(
        g.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
        vec!["2", "1", "0"]
    );
    assert_eq!(g.edges.len(), 2);
    assert_eq!(g.clusters.len(), 2);

    let outer = g.cluster("cluster0").unwrap();
    assert_eq!(outer.parent, None);
    assert_eq!(outer.label.text, "WholeStageCodegen (1)");
    assert_eq!(outer.name.as_deref(), Some("PhotonShuffleExchange"));
    assert_eq!(outer.nodes, vec!["1".to_string()]);
    assert_eq!(outer.clusters, vec!["cluster1".to_string()]);

    let inner = g.cluster("cluster1").unwrap();
    assert_eq!(inner.parent.as_deref(), Some("cluster0"));
    assert_eq!(inner.nodes, vec!["2".to_string()]);

    let project = g.node("2").unwrap();
    assert_eq!(project.cluster.as_deref(), Some("cluster1"));
    assert_eq!(project.label.kind, LabelKind::Html);
    assert_eq!(project.name.as_deref(), Some("PhotonProject"));

    let scan = g.node("0").unwrap();
    assert_eq!(scan.cluster, None);
    assert_eq!(scan.label.kind, LabelKind::Text);
    assert_eq!(g.root_clusters().count(), 1);
}

#[test]
fn edge_only_nodes_default_their_label_to_the_id() {
    let g = parse_plan_graph("digraph { a -> b }").unwrap();
    assert_eq!(g.node("a").unwrap().label.text, "a");
    assert_eq!(g.node("b").unwrap().label.text, "b");
}

#[test]
fn defaults_apply_to_later_statements_only() {
    let g = parse_plan_graph(
        r#"digraph {
  a;
  node [class="op"];
  b;
  edge [weight=3];
  a -> b;
}"#,
    )
    .unwrap();
    assert_eq!(g.node("a").unwrap().class, None);
    assert_eq!(g.node("b").unwrap().class.as_deref(), Some("op"));
    assert_eq!(g.edges[0].attrs.get("weight").map(String::as_str), Some("3"));
}

#[test]
fn subgraph_edge_ends_fan_out() {
    let g = parse_plan_graph("digraph { a -> { b c } }").unwrap();
    let pairs: Vec<(&str, &str)> = g
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(pairs, vec![("a", "b"), ("a", "c")]);
    assert!(g.clusters.is_empty());
}

#[test]
fn node_restated_in_a_cluster_moves_into_it() {
    let g = parse_plan_graph(
        r#"digraph {
  a -> b;
  subgraph cluster_x { b [label="B"]; }
}"#,
    )
    .unwrap();
    assert_eq!(g.node("b").unwrap().cluster.as_deref(), Some("cluster_x"));
    assert_eq!(g.cluster("cluster_x").unwrap().nodes, vec!["b".to_string()]);
    assert_eq!(g.node("b").unwrap().label.text, "B");
}

#[test]
fn graph_level_assignments_land_on_the_graph() {
    let g = parse_plan_graph(r#"digraph { rankdir=LR; graph [nodesep=20]; a }"#).unwrap();
    assert_eq!(g.attrs.get("rankdir").map(String::as_str), Some("LR"));
    assert_eq!(g.attrs.get("nodesep").map(String::as_str), Some("20"));
}

#[test]
fn many_statements_on_one_line_build_every_node() {
    let mut text = String::from("digraph G {");
    for i in 0..20_000 {
        text.push_str(&format!(" n{i}; n{i} -> n{};", i + 1));
    }
    text.push_str(" }");
    let g = parse_plan_graph(&text).unwrap();
    assert_eq!(g.nodes.len(), 20_001);
    assert_eq!(g.edges.len(), 20_000);
    assert_eq!(g.nodes[20_000].id, "n20000");
}
