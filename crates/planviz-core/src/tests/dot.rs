use crate::dot::{AttrTarget, EdgeEnd, Stmt, parse_dot};
use crate::Error;

#[test]
fn parses_plan_emitter_output() {
    let text = r#"digraph G {
  subgraph cluster0 {
    isCluster="true";
    label="WholeStageCodegen (1)";
    1 [id="node1" labelType="html" label="<b>Filter</b>" tooltip="filter"];
  }
  0 [labelType="html" label="<b>Scan</b>"];
  0->1;
}"#;
    let dot = parse_dot(text).unwrap();
    assert!(dot.directed);
    assert_eq!(dot.id.as_deref(), Some("G"));
    assert_eq!(dot.stmts.len(), 3);

    let Stmt::Subgraph(sub) = &dot.stmts[0] else {
        panic!("expected subgraph, got {:?}", dot.stmts[0]);
    };
    assert_eq!(sub.id.as_deref(), Some("cluster0"));
    assert!(sub.is_cluster());
    assert_eq!(
        sub.stmts[0],
        Stmt::Assign {
            key: "isCluster".to_string(),
            value: "true".to_string()
        }
    );

    let Stmt::Node { id, attrs } = &sub.stmts[2] else {
        panic!("expected node statement");
    };
    assert_eq!(id, "1");
    assert!(attrs.contains(&("label".to_string(), "<b>Filter</b>".to_string())));

    let Stmt::Edge { chain, .. } = &dot.stmts[2] else {
        panic!("expected edge statement");
    };
    assert_eq!(
        chain,
        &vec![EdgeEnd::Node("0".to_string()), EdgeEnd::Node("1".to_string())]
    );
}

#[test]
fn parses_edge_chains_defaults_and_comments() {
    let text = r#"
// leading comment
strict digraph {
  /* block
     comment */
  node [shape=box, padding=3];
  edge [color=red]
  a -> b -> c [weight=2];
# preprocessor-style line
  "quoted id" -> c
}"#;
    let dot = parse_dot(text).unwrap();
    assert!(dot.strict);
    assert!(dot.id.is_none());
    assert_eq!(
        dot.stmts[0],
        Stmt::Defaults {
            target: AttrTarget::Node,
            attrs: vec![
                ("shape".to_string(), "box".to_string()),
                ("padding".to_string(), "3".to_string())
            ],
        }
    );
    let Stmt::Edge { chain, attrs } = &dot.stmts[2] else {
        panic!("expected edge chain");
    };
    assert_eq!(chain.len(), 3);
    assert_eq!(attrs, &vec![("weight".to_string(), "2".to_string())]);
    let Stmt::Edge { chain, .. } = &dot.stmts[3] else {
        panic!("expected edge");
    };
    assert_eq!(chain[0], EdgeEnd::Node("quoted id".to_string()));
}

#[test]
fn unescapes_quotes_and_joins_continuations() {
    let text = "digraph { a [label=\"say \\\"hi\\\"\" tooltip=\"long \\\nline\"]; }";
    let dot = parse_dot(text).unwrap();
    let Stmt::Node { attrs, .. } = &dot.stmts[0] else {
        panic!("expected node");
    };
    assert_eq!(attrs[0].1, "say \"hi\"");
    assert_eq!(attrs[1].1, "long line");
}

#[test]
fn html_string_labels_are_marked_as_html() {
    let dot = parse_dot("digraph { a [label=<<b>x</b>>] }").unwrap();
    let Stmt::Node { attrs, .. } = &dot.stmts[0] else {
        panic!("expected node");
    };
    assert_eq!(
        attrs,
        &vec![
            ("labelType".to_string(), "html".to_string()),
            ("label".to_string(), "<b>x</b>".to_string())
        ]
    );
}

#[test]
fn concatenates_quoted_strings_and_ignores_ports() {
    let dot = parse_dot(r#"digraph { "a" + "b" -> c:p1:n }"#).unwrap();
    let Stmt::Edge { chain, .. } = &dot.stmts[0] else {
        panic!("expected edge");
    };
    assert_eq!(
        chain,
        &vec![EdgeEnd::Node("ab".to_string()), EdgeEnd::Node("c".to_string())]
    );
}

#[test]
fn reports_position_of_malformed_input() {
    let err = parse_dot("digraph {\n  a -> ;\n}").unwrap_err();
    let Error::DotParse { line, column, .. } = err else {
        panic!("expected DotParse, got {err:?}");
    };
    assert_eq!((line, column), (2, 8));
}

#[test]
fn columns_count_characters_not_bytes() {
    let err = parse_dot("digraph { \u{e9}t\u{e9} -> ; }").unwrap_err();
    let Error::DotParse { line, column, .. } = err else {
        panic!("expected DotParse, got {err:?}");
    };
    assert_eq!((line, column), (1, 18));
}

#[test]
fn hash_only_comments_out_lines_that_start_with_it() {
    let dot = parse_dot("digraph {\n\t  # skipped -> ;\n  a\n}").unwrap();
    assert_eq!(dot.stmts.len(), 1);

    let err = parse_dot("digraph {\n  a\n  b # c\n}").unwrap_err();
    let Error::DotParse { line, column, .. } = err else {
        panic!("expected DotParse, got {err:?}");
    };
    assert_eq!((line, column), (3, 5));
}

#[test]
fn long_single_line_input_parses() {
    const COUNT: usize = 20_000;
    let mut body = String::from("digraph G {");
    for i in 0..COUNT {
        body.push_str(&format!(" n{i} [label=\"node {i}\"];"));
    }
    let dot = parse_dot(&format!("{body} n0 -> n1; }}")).unwrap();
    assert_eq!(dot.stmts.len(), COUNT + 1);

    let broken = format!("{body} n0 -> ; }}");
    let err = parse_dot(&broken).unwrap_err();
    let Error::DotParse { line, column, .. } = err else {
        panic!("expected DotParse, got {err:?}");
    };
    assert_eq!((line, column), (1, broken.chars().count() - 2));
}

#[test]
fn rejects_unterminated_strings_and_mixed_edge_ops() {
    assert!(matches!(
        parse_dot("digraph { a [label=\"oops] }"),
        Err(Error::DotParse { .. })
    ));
    assert!(matches!(
        parse_dot("digraph { a -- b }"),
        Err(Error::DotParse { .. })
    ));
    assert!(matches!(
        parse_dot("graph { a -> b }"),
        Err(Error::DotParse { .. })
    ));
    assert!(matches!(parse_dot("digraph { a }}"), Err(Error::DotParse { .. })));
    assert!(matches!(parse_dot("flowchart TD"), Err(Error::DotParse { .. })));
}

#[test]
fn numerals_and_undirected_graphs() {
    let dot = parse_dot("graph { -1.5 -- .5 -- 7 }").unwrap();
    assert!(!dot.directed);
    let Stmt::Edge { chain, .. } = &dot.stmts[0] else {
        panic!("expected edge");
    };
    assert_eq!(
        chain,
        &vec![
            EdgeEnd::Node("-1.5".to_string()),
            EdgeEnd::Node(".5".to_string()),
            EdgeEnd::Node("7".to_string())
        ]
    );
}
