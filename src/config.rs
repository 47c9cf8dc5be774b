use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Deploy-time pipeline configuration. There are no CLI flags and no
/// environment variables; deployments that need to override the defaults
/// ship a YAML file next to the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Columns holding date-like strings the extractor parses to timestamps.
    pub date_columns: Vec<String>,
    /// The single column calendar features (`year`, `month`, `day_name`)
    /// derive from. Must also appear in `date_columns`.
    pub designated_date_column: String,
    /// Numeric columns truncated to integer storage after imputation.
    pub integer_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            date_columns: vec!["date".into()],
            designated_date_column: "date".into(),
            integer_columns: vec!["age".into()],
        }
    }
}

impl PipelineConfig {
    /// Load a YAML override file written at deploy time.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.as_ref().display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.as_ref().display()))
    }
}
