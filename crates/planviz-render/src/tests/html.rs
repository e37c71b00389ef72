use crate::html::{plain_lines, to_xhtml, visible_lines};

const HIDDEN_PANEL: &str = "<b>Scan parquet</b><br><div id='plan-node-details-3' style='display: none;' class='plan-details-search'><table><tr><td>rows</td><td>10</td></tr></table></div>";
const SHOWN_PANEL: &str = "<b>Scan parquet</b><br><div id='plan-node-details-3'><table><tr><td>rows</td><td>10</td></tr></table></div>";

#[test]
fn hidden_fragments_are_not_visible() {
    assert_eq!(visible_lines(HIDDEN_PANEL), vec!["Scan parquet"]);
    assert_eq!(visible_lines(SHOWN_PANEL), vec!["Scan parquet", "rows 10"]);
}

#[test]
fn hidden_cells_drop_out_of_their_row() {
    let html = "<tr><td>time</td><td style='display: none;' class='hideable-cell'>12 ms</td></tr>";
    assert_eq!(visible_lines(html), vec!["time"]);
}

#[test]
fn entities_and_whitespace_are_normalized() {
    assert_eq!(visible_lines("a &amp;  b&nbsp;c\n  d"), vec!["a & b c", "d"]);
}

#[test]
fn plain_labels_split_on_escaped_newlines() {
    assert_eq!(plain_lines("Exchange\\nhashpartitioning"), vec!["Exchange", "hashpartitioning"]);
}

#[test]
fn xhtml_is_well_formed() {
    assert_eq!(
        to_xhtml("<b>x</b><br><td colspan=2>&lt;y&gt;"),
        r#"<b>x</b><br/><td colspan="2">&lt;y&gt;</td>"#
    );
    assert_eq!(to_xhtml("</i>text<b>open"), "text<b>open</b>");
    assert_eq!(
        to_xhtml("<div id='a' id='b'><span>1</div>"),
        r#"<div id="a"><span>1</span></div>"#
    );
}

#[test]
fn xhtml_output_parses_as_xml() {
    let xhtml = to_xhtml(SHOWN_PANEL);
    let wrapped = format!("<root>{xhtml}</root>");
    let doc = roxmltree::Document::parse(&wrapped).unwrap();
    assert!(doc.descendants().any(|n| n.has_tag_name("table")));
}

#[test]
fn prefixed_tags_and_control_characters_stay_well_formed() {
    assert_eq!(to_xhtml("<x:y>ns</x:y>"), "ns");
    assert_eq!(to_xhtml("<b>\u{0}ctl\u{1f}</b>"), "<b>ctl</b>");
    assert_eq!(
        to_xhtml(r#"<span a:b='1' data-k="2" ~c=3>v</span>"#),
        r#"<span data-k="2">v</span>"#
    );

    let xhtml = to_xhtml("<x:y><b>\u{0}bold</b> &#1; tail</x:y>");
    let wrapped = format!("<root>{xhtml}</root>");
    let doc = roxmltree::Document::parse(&wrapped).unwrap();
    assert!(doc.descendants().any(|n| n.has_tag_name("b")));
    assert!(!doc.descendants().any(|n| n.tag_name().name() == "y"));
}
