//! Detail panel and hidden-metric visibility.
//!
//! Node labels embed a collapsible details panel
//! (`<div id='plan-node-details-N' ...>`) and metric table cells tagged
//! `class='hideable-cell'`. Visibility is tracked here as explicit flags; [`ViewState::apply`]
//! rewrites each panel/cell opening tag from those flags, whatever the tag currently says, so a
//! toggle never depends on the markers left behind by a previous render.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

const HIDDEN_STYLE: &str = " style='display: none;'";
const PANEL_CLASS: &str = " class='plan-details-search'";
const HIDEABLE_CLASS: &str = " class='hideable-cell'";

fn panel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"<div id='plan-node-details-(\d+)'( style='display: none;' class='plan-details-search')?>",
        )
        .unwrap()
    })
}

fn hideable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"( style='display: none;')? class='hideable-cell'").unwrap())
}

/// Visibility flags for every detail panel plus the hidden-metrics switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewState {
    /// Explicit per-panel visibility, keyed by node id.
    pub panels: BTreeMap<u32, bool>,
    /// Visibility of panels without an explicit entry.
    pub panels_visible_by_default: bool,
    pub show_hidden_metrics: bool,
}

impl ViewState {
    /// Seeds the flags from the markers present in a freshly emitted description.
    pub fn from_description(text: &str) -> Self {
        let mut state = Self::default();
        for caps in panel_re().captures_iter(text) {
            let Ok(id) = caps[1].parse::<u32>() else {
                continue;
            };
            state.panels.insert(id, caps.get(2).is_none());
        }

        let mut cells = 0usize;
        let mut hidden = 0usize;
        for caps in hideable_re().captures_iter(text) {
            cells += 1;
            if caps.get(1).is_some() {
                hidden += 1;
            }
        }
        state.show_hidden_metrics = cells > 0 && hidden == 0;
        state
    }

    pub fn is_panel_visible(&self, id: u32) -> bool {
        self.panels
            .get(&id)
            .copied()
            .unwrap_or(self.panels_visible_by_default)
    }

    pub fn set_panel(&mut self, id: u32, visible: bool) {
        self.panels.insert(id, visible);
    }

    /// Flips one panel and returns its new visibility.
    pub fn toggle_panel(&mut self, id: u32) -> bool {
        let visible = !self.is_panel_visible(id);
        self.set_panel(id, visible);
        visible
    }

    /// Shows or hides every panel, including ones not seen yet.
    pub fn expand_all(&mut self, visible: bool) {
        self.panels.clear();
        self.panels_visible_by_default = visible;
    }

    pub fn set_show_hidden_metrics(&mut self, show: bool) {
        self.show_hidden_metrics = show;
    }

    /// Produces the description text for the next render.
    pub fn apply(&self, text: &str) -> String {
        let text = panel_re().replace_all(text, |caps: &Captures<'_>| {
            let id = &caps[1];
            let visible = id
                .parse::<u32>()
                .map(|id| self.is_panel_visible(id))
                .unwrap_or(self.panels_visible_by_default);
            if visible {
                format!("<div id='plan-node-details-{id}'>")
            } else {
                format!("<div id='plan-node-details-{id}'{HIDDEN_STYLE}{PANEL_CLASS}>")
            }
        });

        let replacement = if self.show_hidden_metrics {
            HIDEABLE_CLASS.to_string()
        } else {
            format!("{HIDDEN_STYLE}{HIDEABLE_CLASS}")
        };
        hideable_re()
            .replace_all(&text, replacement.as_str())
            .into_owned()
    }
}
