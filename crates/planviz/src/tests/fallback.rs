use crate::PlanViz;
use crate::fallback::{FALLBACK_ATTR, foreign_object_text_fallback};

const PLAN: &str = r#"digraph G {
  subgraph cluster0 {
    isCluster="true";
    label="WholeStageCodegen (1)";
    0 [labelType="html" label="<b>PhotonScan</b><br>rows: 10<div style='display: none;'>hidden</div>" name="PhotonScan"];
  }
  1 [label="Exchange"];
  0->1;
}"#;

fn rendered() -> PlanViz {
    let mut viz = PlanViz::new(PLAN);
    viz.render().unwrap();
    viz
}

fn texts(drawing: &crate::Drawing) -> Vec<String> {
    drawing
        .select_tag("text")
        .into_iter()
        .filter_map(|t| drawing.get(t).and_then(|e| e.text.clone()))
        .collect()
}

#[test]
fn every_label_becomes_text() {
    let viz = rendered();
    let original = viz.drawing().unwrap();
    let labels = original.select_tag("foreignObject").len();
    assert_eq!(labels, 3);

    let flat = foreign_object_text_fallback(original, 14.0).unwrap();
    assert!(flat.select_tag("foreignObject").is_empty());
    assert_eq!(flat.select_tag("g").iter().filter(|&&g| flat.attr(g, FALLBACK_ATTR).is_some()).count(), 3);

    let texts = texts(&flat);
    assert!(texts.contains(&"PhotonScan".to_string()));
    assert!(texts.contains(&"rows: 10".to_string()));
    assert!(texts.contains(&"Exchange".to_string()));
    assert!(texts.contains(&"WholeStageCodegen (1)".to_string()));
    assert!(!texts.iter().any(|t| t.contains("hidden")));
}

#[test]
fn lines_are_centered_in_the_label_box() {
    let viz = rendered();
    let original = viz.drawing().unwrap();
    let node = original.find_by_id("1").unwrap();
    let fo = original.find_tag(node, "foreignObject").unwrap();
    let width: f64 = original.attr(fo, "width").unwrap().parse().unwrap();
    let height: f64 = original.attr(fo, "height").unwrap().parse().unwrap();

    let flat = foreign_object_text_fallback(original, 14.0).unwrap();
    let node = flat.find_by_id("1").unwrap();
    let text = flat.find_tag(node, "text").unwrap();
    let x: f64 = flat.attr(text, "x").unwrap().parse().unwrap();
    let y: f64 = flat.attr(text, "y").unwrap().parse().unwrap();
    assert!((x - width / 2.0).abs() < 1e-9);
    assert!((y - height / 2.0).abs() < 1e-9);
}

#[test]
fn source_drawing_is_untouched() {
    let viz = rendered();
    let before = viz.svg().unwrap();
    let _ = foreign_object_text_fallback(viz.drawing().unwrap(), 14.0).unwrap();
    assert_eq!(viz.svg().unwrap(), before);
    assert!(before.contains("<foreignObject"));
}
