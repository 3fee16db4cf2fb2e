//! Hierarchical penalty rules keyed by conjunctions of tag predicates
//!
//! Rules are edited as a flat [`RuleSet`] (`"W:highway==primary && W:sidewalk==both"`
//! mapped to a [`Weight`]) and compiled into a [`RuleEngine`] tree for
//! evaluation while pricing edges.

mod engine;
mod predicate;
mod set;
mod tree;

pub use engine::{CombineMode, EdgeTags, Penalty, RuleEngine};
pub use predicate::{Predicate, RuleKey, Scope};
pub use set::{RuleSet, Weight};
pub use tree::{RuleNode, RuleTree};
