use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Page-level inputs that travel next to the graph description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMetadata {
    /// Page title; the exported image is named after it.
    pub title: Option<String>,
    /// Href of the visualization stylesheet, used to recover the page's path prefix.
    pub stylesheet_href: Option<String>,
    /// Tooltip text per plan node, indexed by the node's numeric id.
    pub tooltips: Vec<String>,
}

impl PageMetadata {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn node_count(&self) -> usize {
        self.tooltips.len()
    }

    pub fn tooltip(&self, node_index: usize) -> Option<&str> {
        self.tooltips.get(node_index).map(String::as_str)
    }
}
