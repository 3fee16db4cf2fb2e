use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    predicate::{Predicate, RuleKey, Scope},
    set::Weight,
    tree::RuleTree,
};
use crate::{
    Error, Tags,
    model::{MapNode, MapWay},
};

/// How rules matching at different depths of a conjunction chain combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// The most specific matching conjunction replaces its ancestors
    #[default]
    Override,
    /// Every matching rule at every depth contributes
    Additive,
}

impl CombineMode {
    pub fn from_override_flag(override_rules: bool) -> Self {
        if override_rules {
            CombineMode::Override
        } else {
            CombineMode::Additive
        }
    }
}

/// Accumulated penalty of one edge
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Penalty {
    /// Multiplier added to 1 and applied to the segment length
    pub distance: f64,
    /// Flat cost added to the segment
    pub fixed: f64,
    /// Number of predicate matches that contributed
    pub fired: usize,
}

/// Tag sources of one directed edge
#[derive(Debug, Clone, Copy)]
pub struct EdgeTags<'a> {
    pub from: &'a Tags,
    pub to: &'a Tags,
    pub way: &'a Tags,
}

impl<'a> EdgeTags<'a> {
    pub fn new(from: &'a MapNode, to: &'a MapNode, way: &'a MapWay) -> Self {
        Self {
            from: &from.tags,
            to: &to.tags,
            way: &way.tags,
        }
    }

    fn sources(&self) -> [(Scope, &'a Tags); 3] {
        [
            (Scope::Node, self.from),
            (Scope::Node, self.to),
            (Scope::Way, self.way),
        ]
    }
}

/// Compiled rule hierarchy used as the edge cost function
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    tree: RuleTree,
    mode: CombineMode,
}

impl RuleEngine {
    pub fn new(tree: RuleTree, mode: CombineMode) -> Self {
        Self { tree, mode }
    }

    /// Engine without rules: every edge costs its length
    pub fn empty(mode: CombineMode) -> Self {
        Self::new(RuleTree::default(), mode)
    }

    /// Penalty for traversing `way` from `from` to `to`
    pub fn evaluate_penalty(&self, from: &MapNode, to: &MapNode, way: &MapWay) -> Penalty {
        self.evaluate(&self.tree, EdgeTags::new(from, to, way))
    }

    /// Like [`evaluate_penalty`](Self::evaluate_penalty), but a negative
    /// component is reported as [`Error::NegativePenalty`].
    pub fn checked_penalty(
        &self,
        from: &MapNode,
        to: &MapNode,
        way: &MapWay,
    ) -> Result<Penalty, Error> {
        let penalty = self.evaluate_penalty(from, to, way);
        if penalty.distance < 0.0 || penalty.fixed < 0.0 {
            log::error!(
                "Negative penalty ({}, {}) from {} to {} on {}",
                penalty.distance,
                penalty.fixed,
                from.osm_url(),
                to.osm_url(),
                way.osm_url()
            );
            return Err(Error::NegativePenalty {
                from: from.id,
                to: to.id,
                way: way.id,
                distance: penalty.distance,
                fixed: penalty.fixed,
            });
        }
        Ok(penalty)
    }

    /// Cost of traversing a segment of `length` meters:
    /// `length * (1 + distance) + fixed`
    pub fn segment_cost(
        &self,
        from: &MapNode,
        to: &MapNode,
        way: &MapWay,
        length: f64,
    ) -> Result<f64, Error> {
        let penalty = self.checked_penalty(from, to, way)?;
        Ok(length * (1.0 + penalty.distance.max(0.0)) + penalty.fixed.max(0.0))
    }

    /// Rules that fired on the edge, keyed by their full conjunction, with
    /// the weight each contributed under the engine's combine mode.
    pub fn extract_fired_rules(
        &self,
        from: &MapNode,
        to: &MapNode,
        way: &MapWay,
    ) -> BTreeMap<RuleKey, Weight> {
        self.fired(&self.tree, EdgeTags::new(from, to, way))
    }

    fn evaluate(&self, tree: &RuleTree, edge: EdgeTags<'_>) -> Penalty {
        let mut total = Penalty::default();
        if tree.is_empty() {
            return total;
        }

        for (scope, tags) in edge.sources() {
            let rules = tree.scoped(scope);
            if rules.is_empty() {
                continue;
            }
            for (key, value) in tags {
                let Some(rule) = rules.get(key, value) else {
                    continue;
                };
                let deeper = self.evaluate(&rule.children, edge);
                total.fired += deeper.fired;

                match self.mode {
                    CombineMode::Override if deeper.fired > 0 => {
                        total.distance += deeper.distance;
                        total.fixed += deeper.fixed;
                    }
                    CombineMode::Override => {
                        total.fired += 1;
                        total.distance += rule.weight.distance;
                        total.fixed += rule.weight.fixed;
                    }
                    CombineMode::Additive => {
                        total.fired += 1;
                        total.distance += rule.weight.distance + deeper.distance;
                        total.fixed += rule.weight.fixed + deeper.fixed;
                    }
                }
            }
        }
        total
    }

    fn fired(&self, tree: &RuleTree, edge: EdgeTags<'_>) -> BTreeMap<RuleKey, Weight> {
        let mut rules = BTreeMap::new();
        if tree.is_empty() {
            return rules;
        }

        for (scope, tags) in edge.sources() {
            let scoped = tree.scoped(scope);
            if scoped.is_empty() {
                continue;
            }
            for (key, value) in tags {
                let Some(rule) = scoped.get(key, value) else {
                    continue;
                };
                let predicate = Predicate::new(scope, key.as_str(), value.as_str());
                let deeper = self.fired(&rule.children, edge);
                let has_deeper = !deeper.is_empty();

                for (sub_key, weight) in deeper {
                    rules.insert(RuleKey::prefixed(predicate.clone(), &sub_key), weight);
                }
                if self.mode == CombineMode::Additive || !has_deeper {
                    rules.insert(RuleKey::single(predicate), rule.weight);
                }
            }
        }
        rules
    }
}
