use assert_cmd::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/plan")
        .join(name)
}

fn run(args: &[&str]) -> std::process::Output {
    let exe = assert_cmd::cargo_bin!("planviz-cli");
    Command::new(exe).args(args).output().expect("run cli")
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[test]
fn parse_prints_the_plan_graph() {
    let path = fixture("basic.dot");
    let json = stdout_json(&run(&["parse", path.to_str().unwrap()]));
    assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(json["edges"].as_array().unwrap().len(), 1);
    assert_eq!(json["clusters"].as_array().unwrap().len(), 1);
}

#[test]
fn layout_prints_geometry() {
    let path = fixture("nested.dot");
    let json = stdout_json(&run(&["layout", "--pretty", path.to_str().unwrap()]));
    assert!(json["width"].as_f64().unwrap() > 0.0);
    assert!(json["height"].as_f64().unwrap() > 0.0);
    assert_eq!(json["nodes"].as_array().unwrap().len(), 6);
}

#[test]
fn render_prints_svg() {
    let path = fixture("basic.dot");
    let output = run(&["render", path.to_str().unwrap()]);
    assert!(output.status.success());
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("viewBox="));
    assert!(svg.contains("display: none"));
}

#[test]
fn expand_all_reveals_detail_panels() {
    let path = fixture("basic.dot");
    let output = run(&["render", "--expand-all", path.to_str().unwrap()]);
    assert!(output.status.success());
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(svg.contains("plan-node-details-1"));
    assert!(!svg.contains("display: none"));
}

#[test]
fn stylesheet_href_prefixes_stage_links() {
    let path = fixture("nested.dot");
    let output = run(&[
        "render",
        "--stylesheet-href",
        "/proxy/app-1/static/sql/spark-sql-viz.css",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(svg.contains("href=\"/proxy/app-1/stage?id=3&amp;attempt=0\""));
}

#[test]
fn usage_errors_exit_with_two() {
    let output = run(&["render", "--format", "gif"]);
    assert_eq!(output.status.code(), Some(2));
    let output = run(&["--bogus"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn parse_errors_exit_with_one() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let bad = tmp.path().join("bad.dot");
    std::fs::write(&bad, "digraph G { 0 -> }").unwrap();
    let output = run(&["parse", bad.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}
