use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Layout tuning. All lengths are renderer pixels.
///
/// Any subset of fields may be given in a TOML file; missing fields keep
/// their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of activity and complex cards.
    pub node_width: f64,
    /// Card height used until the renderer reports a measured one.
    pub default_node_height: f64,
    /// Diameter of molecule circles.
    pub molecule_size: f64,

    /// Vertical gap between ranks.
    pub rank_sep: f64,
    /// Horizontal gap between neighbours in a rank.
    pub node_sep: f64,

    /// Floor for the canvas height, even for empty graphs.
    pub min_container_height: f64,
    /// Added below the laid-out span.
    pub container_padding: f64,

    /// Barycenter sweeps (one down and one up each) when ordering ranks.
    pub ordering_passes: usize,
    /// Upper bound on rank tightening rounds.
    pub tightening_rounds: usize,

    // Edge label measurement
    pub label_char_width: f64,
    pub label_line_height: f64,
    pub label_max_columns: usize,
    pub label_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 300.0,
            default_node_height: 140.0,
            molecule_size: 80.0,
            rank_sep: 100.0,
            node_sep: 50.0,
            min_container_height: 500.0,
            container_padding: 100.0,
            ordering_passes: 4,
            tightening_rounds: 32,
            label_char_width: 7.0,
            label_line_height: 16.0,
            label_max_columns: 24,
            label_padding: 8.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
