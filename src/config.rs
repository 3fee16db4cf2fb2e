use std::path::{Path, PathBuf};

use routrain_core::config::LearnerConfig;
use serde::Deserialize;

use crate::error::AppError;

/// Settings of a training run, read from TOML.
///
/// ```toml
/// graph = "data/map.json"
/// training = "data/examples.json"
/// rules_out = "out/rules.json"
///
/// [learner]
/// override = true
/// max_iterations = 500
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Map document with nodes and ways
    pub graph: PathBuf,
    /// Ordered list of training examples
    pub training: PathBuf,
    /// Rule set to start from, empty when unset
    #[serde(default)]
    pub initial_rules: Option<PathBuf>,
    pub rules_out: PathBuf,
    /// Where to write the routes of all examples under the learned rules
    #[serde(default)]
    pub geojson_out: Option<PathBuf>,
    #[serde(default)]
    pub learner: LearnerConfig,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|source| AppError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
