//! Configuration of the rule learner

use serde::{Deserialize, Serialize};

use crate::rules::CombineMode;

/// Tuning knobs of the rule learner. Every field has a default, so a
/// partial TOML or JSON table is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Most specific rule wins (`true`) or all matching rules add up
    #[serde(rename = "override")]
    pub override_mode: bool,
    /// Maximum number of conjuncts in a candidate rule
    pub candidate_depth: usize,
    /// Added to the direct cost when computing the relative error
    pub epsilon: f64,
    /// Relative error in percent below which an example passes
    pub pass_threshold: f64,
    /// Factor applied to a failing example's absolute error before it is
    /// compensated, so that the desired route ends up strictly cheaper
    pub error_inflation: f64,
    /// Non-improving iterations before part of the error goes to new rules
    pub stagnation_patience: usize,
    /// Non-improving iterations after which learning stops as stalled
    pub stall_limit: usize,
    /// Share of the error compensated by existing rules while exploring
    pub explore_old_factor: f64,
    /// Share of the error spent on new rules while exploring
    pub explore_new_factor: f64,
    /// Hard cap on iterations, unlimited when unset
    pub max_iterations: Option<usize>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            override_mode: true,
            candidate_depth: 4,
            epsilon: 1e-4,
            pass_threshold: 1e-8,
            error_inflation: 1.000_001,
            stagnation_patience: 10,
            stall_limit: 100,
            explore_old_factor: 0.9,
            explore_new_factor: 0.1,
            max_iterations: None,
        }
    }
}

impl LearnerConfig {
    pub fn combine_mode(&self) -> CombineMode {
        CombineMode::from_override_flag(self.override_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: LearnerConfig =
            serde_json::from_str(r#"{"override": false, "stall_limit": 20}"#).unwrap();
        assert_eq!(config.combine_mode(), CombineMode::Additive);
        assert_eq!(config.stall_limit, 20);
        assert_eq!(config.candidate_depth, 4);
        assert_eq!(config.max_iterations, None);
    }
}
