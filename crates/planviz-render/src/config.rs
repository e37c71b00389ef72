use crate::{Error, Result};
use planviz_layout::{GraphLabel, Interpolation, RankDir};
use serde::{Deserialize, Serialize};

/// Drawing and layout settings. Every field has a default, so a partial JSON object is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanVizConfig {
    /// Free space kept around the drawing when sizing the viewport.
    pub svg_margin_x: f64,
    pub svg_margin_y: f64,
    /// Padding between a node's label and its border.
    pub node_padding: f64,
    pub corner_radius: f64,
    /// Gap between a cluster label and the cluster's right border.
    pub cluster_label_inset: f64,
    /// Substring of the `name` attribute marking work done by the alternate engine.
    pub engine_marker: String,
    pub node_class: String,
    pub cluster_class: String,
    pub rankdir: String,
    pub nodesep: f64,
    pub ranksep: f64,
    pub edgesep: f64,
    pub cluster_padding: f64,
    pub font_size: f64,
    pub edge_interpolation: String,
}

impl Default for PlanVizConfig {
    fn default() -> Self {
        Self {
            svg_margin_x: 16.0,
            svg_margin_y: 16.0,
            node_padding: 5.0,
            corner_radius: 5.0,
            cluster_label_inset: 20.0,
            engine_marker: "Photon".to_string(),
            node_class: "photonNode".to_string(),
            cluster_class: "photonCluster".to_string(),
            rankdir: "TB".to_string(),
            nodesep: 50.0,
            ranksep: 50.0,
            edgesep: 10.0,
            cluster_padding: 10.0,
            font_size: 14.0,
            edge_interpolation: "basis".to_string(),
        }
    }
}

impl PlanVizConfig {
    /// Parses and validates a JSON config object.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.rank_dir()?;
        self.interpolation()?;
        let lengths = [
            ("svgMarginX", self.svg_margin_x),
            ("svgMarginY", self.svg_margin_y),
            ("nodePadding", self.node_padding),
            ("cornerRadius", self.corner_radius),
            ("clusterLabelInset", self.cluster_label_inset),
            ("nodesep", self.nodesep),
            ("ranksep", self.ranksep),
            ("edgesep", self.edgesep),
            ("clusterPadding", self.cluster_padding),
        ];
        for (key, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{key} must be a non-negative number, got {value}")));
            }
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(invalid(format!("fontSize must be positive, got {}", self.font_size)));
        }
        if self.node_class.trim().is_empty() || self.cluster_class.trim().is_empty() {
            return Err(invalid("nodeClass and clusterClass must not be empty"));
        }
        Ok(())
    }

    pub fn rank_dir(&self) -> Result<RankDir> {
        RankDir::parse(&self.rankdir)
            .ok_or_else(|| invalid(format!("unknown rankdir {:?}", self.rankdir)))
    }

    pub fn interpolation(&self) -> Result<Interpolation> {
        Interpolation::parse(&self.edge_interpolation).ok_or_else(|| {
            invalid(format!(
                "unknown edgeInterpolation {:?} (expected \"basis\" or \"linear\")",
                self.edge_interpolation
            ))
        })
    }

    pub fn graph_label(&self) -> Result<GraphLabel> {
        Ok(GraphLabel {
            rankdir: self.rank_dir()?,
            nodesep: self.nodesep,
            ranksep: self.ranksep,
            edgesep: self.edgesep,
            cluster_padding: self.cluster_padding,
            ..Default::default()
        })
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfig {
        message: message.into(),
    }
}
