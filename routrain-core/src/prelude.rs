// Re-export key components
pub use crate::attribution::{TagUsage, UsageProfile, candidate_tags, used_tags};
pub use crate::config::LearnerConfig;
pub use crate::learning::{
    IterationReport, LearnOutcome, LearnerState, LogReporter, ProgressReporter, RuleLearner,
    TrainingExample,
};
pub use crate::loading::{
    GraphBuilder, MapDocument, load_graph, load_rules, load_training, save_rules,
};
pub use crate::model::{GraphModel, MapNode, MapWay, great_circle_distance};
pub use crate::routing::{PathStep, Route, Router};
pub use crate::rules::{CombineMode, Penalty, Predicate, RuleEngine, RuleKey, RuleSet, Scope, Weight};

// Core identifier types
pub use crate::Error;
pub use crate::NodeId;
pub use crate::Tags;
pub use crate::WayId;
