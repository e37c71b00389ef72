use crate::drawing::{Drawing, ElementId};
use crate::postprocess::{adjust_cluster_labels, classify, postprocess, round_corners};
use crate::PlanVizConfig;

struct Scene {
    drawing: Drawing,
    cluster: ElementId,
    label: ElementId,
    nodes: Vec<ElementId>,
}

/// One cluster labelled at `translate(100,50)` with a 40 wide label, and two nodes.
fn scene(label_width: &str) -> Scene {
    let mut d = Drawing::new("svg");
    let output = d.append(d.root(), "g").unwrap();
    d.set_attr(output, "class", "output").unwrap();
    let clusters = d.append(output, "g").unwrap();
    d.set_attr(clusters, "class", "clusters").unwrap();
    let cluster = d.append(clusters, "g").unwrap();
    d.set_attr(cluster, "class", "cluster").unwrap();
    d.set_attr(cluster, "name", "WholeStageCodegen").unwrap();
    d.set_attr(cluster, "transform", "translate(60,90)").unwrap();
    let rect = d.append(cluster, "rect").unwrap();
    d.set_attr(rect, "width", "200").unwrap();
    let label = d.append(cluster, "g").unwrap();
    d.set_attr(label, "class", "label").unwrap();
    d.set_attr(label, "transform", "translate(100,50)").unwrap();
    let fo = d.append(label, "foreignObject").unwrap();
    d.set_attr(fo, "width", label_width).unwrap();

    let group = d.append(output, "g").unwrap();
    d.set_attr(group, "class", "nodes").unwrap();
    let mut nodes = Vec::new();
    for name in ["PhotonShuffleExchangeSink", "Exchange"] {
        let node = d.append(group, "g").unwrap();
        d.set_attr(node, "class", "node").unwrap();
        d.set_attr(node, "name", name).unwrap();
        d.append(node, "rect").unwrap();
        nodes.push(node);
    }
    Scene {
        drawing: d,
        cluster,
        label,
        nodes,
    }
}

#[test]
fn moves_cluster_label_inside_the_right_border() {
    let mut s = scene("40");
    assert_eq!(adjust_cluster_labels(&mut s.drawing, 20.0).unwrap(), 1);
    assert_eq!(s.drawing.attr(s.label, "transform"), Some("translate(40,50)"));
}

#[test]
fn label_width_may_carry_px() {
    let mut s = scene("40px");
    adjust_cluster_labels(&mut s.drawing, 20.0).unwrap();
    assert_eq!(s.drawing.attr(s.label, "transform"), Some("translate(40,50)"));
}

#[test]
fn repositioning_twice_lands_in_the_same_place() {
    let mut s = scene("40");
    adjust_cluster_labels(&mut s.drawing, 20.0).unwrap();
    adjust_cluster_labels(&mut s.drawing, 20.0).unwrap();
    assert_eq!(s.drawing.attr(s.label, "transform"), Some("translate(40,50)"));
}

#[test]
fn labels_without_translate_are_skipped() {
    let mut s = scene("40");
    s.drawing.set_attr(s.label, "transform", "scale(2)").unwrap();
    assert_eq!(adjust_cluster_labels(&mut s.drawing, 20.0).unwrap(), 0);
    assert_eq!(s.drawing.attr(s.label, "transform"), Some("scale(2)"));

    s.drawing.remove_attr(s.label, "transform").unwrap();
    assert_eq!(adjust_cluster_labels(&mut s.drawing, 20.0).unwrap(), 0);
}

#[test]
fn classification_tags_marker_names_only() {
    let mut s = scene("40");
    s.drawing.set_class(s.nodes[1], "photonNode", true).unwrap();
    s.drawing
        .set_attr(s.cluster, "name", "PhotonResultStage")
        .unwrap();

    let tagged = classify(&mut s.drawing, "Photon", "photonNode", "photonCluster").unwrap();
    assert_eq!(tagged, 2);
    assert!(s.drawing.has_class(s.nodes[0], "photonNode"));
    assert!(!s.drawing.has_class(s.nodes[1], "photonNode"));
    assert!(s.drawing.has_class(s.nodes[1], "node"));
    assert!(s.drawing.has_class(s.cluster, "photonCluster"));
    assert!(!s.drawing.has_class(s.cluster, "photonNode"));

    let again = classify(&mut s.drawing, "Photon", "photonNode", "photonCluster").unwrap();
    assert_eq!(again, 2);
    assert_eq!(s.drawing.attr(s.nodes[0], "class"), Some("node photonNode"));
}

#[test]
fn every_rect_gets_rounded_corners() {
    let mut s = scene("40");
    assert_eq!(round_corners(&mut s.drawing, 5.0).unwrap(), 3);
    for rect in s.drawing.select_tag("rect") {
        assert_eq!(s.drawing.attr(rect, "rx"), Some("5"));
        assert_eq!(s.drawing.attr(rect, "ry"), Some("5"));
    }
}

#[test]
fn postprocess_runs_all_fixes() {
    let mut s = scene("40");
    postprocess(&mut s.drawing, &PlanVizConfig::default()).unwrap();
    assert_eq!(s.drawing.attr(s.label, "transform"), Some("translate(40,50)"));
    assert!(s.drawing.has_class(s.nodes[0], "photonNode"));
    assert!(
        s.drawing
            .select_tag("rect")
            .iter()
            .all(|&r| s.drawing.attr(r, "rx") == Some("5"))
    );
}
