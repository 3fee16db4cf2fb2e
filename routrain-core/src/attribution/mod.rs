//! Attribution of route costs to rules and tag predicates
//!
//! For a route, [`used_tags`] reports the rules of the current rule set that
//! fired along it, while [`candidate_tags`] enumerates every predicate
//! conjunction that could become a rule. Both weigh a key by the traversed
//! length (keys with a way predicate) and by the number of steps (keys with
//! a node predicate).

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    Error, Tags,
    model::GraphModel,
    routing::Route,
    rules::{Predicate, RuleEngine, RuleKey, Scope},
};

/// Tags that carry no routing semantics and never become predicates
pub const IGNORED_TAGS: &[&str] = &[
    "source",
    "source:geometry",
    "source:maxspeed",
    "name",
    "note",
    "area",
    "wikidata",
    "layer",
    "railway:pos",
    "wikipedia",
    "ref",
    "old_old_name",
    "old_name",
    "ref:RNV:RBL",
    "start_date",
    "created_by",
    "railway:signal:speed_limit",
    "end_date",
    "workrules",
    "operator",
    "destination",
    "admin_level",
    "railway:position",
    "railway:position:exact",
    "railway:signal:crossing:states",
    "ele",
    "railway:signal:position",
    "lcn_ref",
];

/// Usage of one rule key along a route
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TagUsage {
    /// Meters traversed on edges matching a way predicate of the key
    pub length: f64,
    /// Steps on which the key matched with a node predicate
    pub count: f64,
}

impl TagUsage {
    pub fn new(length: f64, count: f64) -> Self {
        Self { length, count }
    }

    pub fn is_zero(&self) -> bool {
        self.length == 0.0 && self.count == 0.0
    }

    /// Squared euclidean norm of the usage vector
    pub fn norm2(&self) -> f64 {
        self.length * self.length + self.count * self.count
    }

    fn record(&mut self, key: &RuleKey, length: f64) {
        if key.has_scope(Scope::Way) {
            self.length += length;
        }
        if key.has_scope(Scope::Node) {
            self.count += 1.0;
        }
    }
}

pub type UsageProfile = BTreeMap<RuleKey, TagUsage>;

/// Rules of `engine` that fired along `route`
///
/// # Errors
///
/// Fails if the route references nodes or ways missing from the graph
pub fn used_tags(
    graph: &GraphModel,
    engine: &RuleEngine,
    route: &Route,
) -> Result<UsageProfile, Error> {
    let mut usage = UsageProfile::new();
    let Some(first) = route.steps.first() else {
        return Ok(usage);
    };

    let mut last = graph.try_node(first.node)?;
    for step in &route.steps {
        let way = graph.try_way(step.way)?;
        let next = graph.try_node(step.node)?;
        for key in engine.extract_fired_rules(last, next, way).into_keys() {
            usage.entry(key.clone()).or_default().record(&key, step.length);
        }
        last = next;
    }
    Ok(usage)
}

/// Every predicate conjunction of at most `depth` conjuncts found along
/// `route`, independent of any rule set.
///
/// On each step the way's predicates come first, followed by the predicates
/// of both endpoints; conjunctions keep that order.
pub fn candidate_tags(
    graph: &GraphModel,
    route: &Route,
    depth: usize,
) -> Result<UsageProfile, Error> {
    let mut usage = UsageProfile::new();
    let mut last_node_predicates = BTreeSet::new();

    for step in &route.steps {
        let way = graph.try_way(step.way)?;
        let node = graph.try_node(step.node)?;

        let node_predicates: BTreeSet<Predicate> = predicates(Scope::Node, &node.tags).collect();
        let mut items: Vec<Predicate> = predicates(Scope::Way, &way.tags).collect();
        items.extend(node_predicates.union(&last_node_predicates).cloned());
        last_node_predicates = node_predicates;

        for key in combinations(&items, depth) {
            usage.entry(key.clone()).or_default().record(&key, step.length);
        }
    }
    Ok(usage)
}

/// `learn - direct` per key, keeping only non-zero differences
pub fn difference(learn: &UsageProfile, direct: &UsageProfile) -> UsageProfile {
    let keys: BTreeSet<&RuleKey> = learn.keys().chain(direct.keys()).collect();
    keys.into_iter()
        .filter_map(|key| {
            let plus = learn.get(key).copied().unwrap_or_default();
            let minus = direct.get(key).copied().unwrap_or_default();
            let delta = TagUsage::new(plus.length - minus.length, plus.count - minus.count);
            (!delta.is_zero()).then(|| (key.clone(), delta))
        })
        .collect()
}

fn predicates(scope: Scope, tags: &Tags) -> impl Iterator<Item = Predicate> + '_ {
    tags.iter()
        .filter(|(key, _)| !IGNORED_TAGS.contains(&key.as_str()))
        .map(move |(key, value)| Predicate::new(scope, key.as_str(), value.as_str()))
        // a rule saved with such a tag could not be loaded back
        .filter(Predicate::is_representable)
}

/// Order-preserving conjunctions of up to `depth` distinct items: every
/// item alone, then each item followed by conjunctions of the items after it.
pub(crate) fn combinations(items: &[Predicate], depth: usize) -> Vec<RuleKey> {
    let mut keys = Vec::new();
    let mut prefix = Vec::with_capacity(depth);
    extend_combinations(items, depth, &mut prefix, &mut keys);
    keys
}

fn extend_combinations(
    items: &[Predicate],
    depth: usize,
    prefix: &mut Vec<Predicate>,
    keys: &mut Vec<RuleKey>,
) {
    if depth == 0 {
        return;
    }
    for (i, item) in items.iter().enumerate() {
        prefix.push(item.clone());
        keys.push(RuleKey::new(prefix.clone()));
        extend_combinations(&items[i + 1..], depth - 1, prefix, keys);
        prefix.pop();
    }
}
