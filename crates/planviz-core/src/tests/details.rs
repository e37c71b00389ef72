use crate::ViewState;

const HIDDEN_1: &str = "<div id='plan-node-details-1' style='display: none;' class='plan-details-search'>";
const SHOWN_1: &str = "<div id='plan-node-details-1'>";

fn description() -> String {
    format!(
        "digraph {{ 1 [labelType=\"html\" label=\"<b>Filter</b>{HIDDEN_1}<table><tr><td style='display: none;' class='hideable-cell'>peak</td><td class='x'>rows</td></tr></table></div>\"]; 2 [label=\"<div id='plan-node-details-2'>x</div>\"] }}"
    )
}

#[test]
fn seeds_flags_from_markers() {
    let state = ViewState::from_description(&description());
    assert!(!state.is_panel_visible(1));
    assert!(state.is_panel_visible(2));
    assert!(!state.show_hidden_metrics);
    // Unknown panels follow the default.
    assert!(!state.is_panel_visible(99));
}

#[test]
fn toggle_rewrites_only_that_panel() {
    let text = description();
    let mut state = ViewState::from_description(&text);
    assert!(state.toggle_panel(1));
    let out = state.apply(&text);
    assert!(out.contains(SHOWN_1));
    assert!(!out.contains(HIDDEN_1));
    assert!(out.contains("<div id='plan-node-details-2'>"));

    assert!(!state.toggle_panel(1));
    let back = state.apply(&out);
    assert!(back.contains(HIDDEN_1));
}

#[test]
fn apply_is_idempotent() {
    let text = description();
    let mut state = ViewState::from_description(&text);
    state.set_show_hidden_metrics(true);
    state.expand_all(true);
    let once = state.apply(&text);
    let twice = state.apply(&once);
    assert_eq!(once, twice);
}

#[test]
fn expand_all_overrides_individual_flags() {
    let text = description();
    let mut state = ViewState::from_description(&text);
    state.expand_all(false);
    let out = state.apply(&text);
    assert!(out.contains(HIDDEN_1));
    assert!(out.contains(
        "<div id='plan-node-details-2' style='display: none;' class='plan-details-search'>"
    ));

    state.expand_all(true);
    let out = state.apply(&out);
    assert!(out.contains(SHOWN_1));
    assert!(out.contains("<div id='plan-node-details-2'>"));
}

#[test]
fn hidden_metrics_switch_rewrites_every_cell() {
    let text = description();
    let mut state = ViewState::from_description(&text);
    state.set_show_hidden_metrics(true);
    let out = state.apply(&text);
    assert!(out.contains("<td class='hideable-cell'>peak</td>"));
    assert!(!out.contains("style='display: none;' class='hideable-cell'"));

    state.set_show_hidden_metrics(false);
    let out = state.apply(&out);
    assert!(out.contains("<td style='display: none;' class='hideable-cell'>peak</td>"));
    // Unrelated cells are untouched.
    assert!(out.contains("<td class='x'>rows</td>"));
}
