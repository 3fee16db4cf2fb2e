use std::{
    collections::BTreeMap,
    ops::{Add, AddAssign},
};

use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    engine::{CombineMode, RuleEngine},
    predicate::RuleKey,
    tree::RuleTree,
};

/// Penalty weights of one rule: `distance` scales the segment length,
/// `fixed` is a flat cost added per traversed edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Weight {
    pub distance: f64,
    pub fixed: f64,
}

impl Weight {
    pub const ZERO: Weight = Weight {
        distance: 0.0,
        fixed: 0.0,
    };

    pub fn new(distance: f64, fixed: f64) -> Self {
        Self { distance, fixed }
    }

    pub fn is_zero(&self) -> bool {
        self.distance == 0.0 && self.fixed == 0.0
    }
}

impl From<(f64, f64)> for Weight {
    fn from((distance, fixed): (f64, f64)) -> Self {
        Self { distance, fixed }
    }
}

impl From<Weight> for (f64, f64) {
    fn from(weight: Weight) -> Self {
        (weight.distance, weight.fixed)
    }
}

impl Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Weight) -> Weight {
        Weight::new(self.distance + rhs.distance, self.fixed + rhs.fixed)
    }
}

impl AddAssign for Weight {
    fn add_assign(&mut self, rhs: Weight) {
        self.distance += rhs.distance;
        self.fixed += rhs.fixed;
    }
}

/// Flat, ordered rule store edited by the learner.
///
/// Serializes as a JSON object mapping the textual rule key to a
/// `[distance, fixed]` pair. Deserialization fills in missing ancestors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: BTreeMap<RuleKey, Weight>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, key: &RuleKey) -> bool {
        self.rules.contains_key(key)
    }

    pub fn get(&self, key: &RuleKey) -> Option<Weight> {
        self.rules.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RuleKey, &Weight)> {
        self.rules.iter()
    }

    /// Sets the weight of an existing or new rule without touching its
    /// ancestors. Returns the previous weight.
    pub fn set(&mut self, key: RuleKey, weight: Weight) -> Option<Weight> {
        self.rules.insert(key, weight)
    }

    /// Adds a rule and every missing ancestor with a zero weight, so that a
    /// conjunction rule never exists without its prefix.
    pub fn add_rule(&mut self, key: RuleKey, weight: Weight) {
        let mut parent = key.parent();
        self.rules.insert(key, weight);
        while let Some(key) = parent {
            if self.rules.contains_key(&key) {
                break;
            }
            debug!("Adding parent rule {key} with zero weight");
            parent = key.parent();
            self.rules.insert(key, Weight::ZERO);
        }
    }

    /// Rules worth reporting: non-zero weights and every conjunction
    pub fn significant(&self) -> impl Iterator<Item = (&RuleKey, &Weight)> {
        self.rules
            .iter()
            .filter(|(key, weight)| !weight.is_zero() || key.conjuncts() > 1)
    }

    /// Builds the evaluation tree for this rule set
    pub fn compile(&self, mode: CombineMode) -> RuleEngine {
        let mut tree = RuleTree::default();
        for (key, weight) in &self.rules {
            tree.insert(key.predicates(), *weight);
        }
        RuleEngine::new(tree, mode)
    }
}

impl FromIterator<(RuleKey, Weight)> for RuleSet {
    fn from_iter<T: IntoIterator<Item = (RuleKey, Weight)>>(iter: T) -> Self {
        let mut rules = RuleSet::new();
        for (key, weight) in iter {
            rules.add_rule(key, weight);
        }
        rules
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rules.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rules = BTreeMap::<RuleKey, Weight>::deserialize(deserializer)?;
        Ok(rules.into_iter().collect())
    }
}
