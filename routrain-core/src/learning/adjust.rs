//! Weight updates for one failing example

use itertools::Itertools;
use log::{debug, trace, warn};

use super::learner::Comparison;
use crate::{
    Error,
    attribution::{TagUsage, UsageProfile, candidate_tags, difference, used_tags},
    config::LearnerConfig,
    model::GraphModel,
    rules::{RuleEngine, RuleKey, RuleSet, Scope, Weight},
};

/// What one adjustment did to the rule set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Adjustment {
    /// Weight edits of existing rules
    pub(crate) changed: usize,
    /// Newly introduced rules, ancestors not counted
    pub(crate) introduced: usize,
}

/// Outcome of the compensation pass over existing rules
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Compensation {
    /// Error no existing rule could absorb
    pub(crate) residual: f64,
    pub(crate) changed: usize,
}

/// Shifts rule weights so that the learn route of `comparison` becomes
/// cheaper than its direct route.
///
/// Existing rules whose usage differs between the two routes absorb the
/// error first. Whatever they cannot absorb, plus the exploration share
/// after `stagnation_patience` non-improving iterations, is spent on a new
/// rule for a predicate the direct route over-uses.
pub(crate) fn adjust_rules(
    graph: &GraphModel,
    engine: &RuleEngine,
    rules: &mut RuleSet,
    comparison: &Comparison,
    config: &LearnerConfig,
    not_improved: usize,
) -> Result<Adjustment, Error> {
    let error = comparison.absolute_error * config.error_inflation;
    let depth = config.candidate_depth;

    let candidates: UsageProfile = difference(
        &candidate_tags(graph, &comparison.learn, depth)?,
        &candidate_tags(graph, &comparison.direct, depth)?,
    )
    .into_iter()
    .filter(|(key, _)| !rules.contains(key))
    .collect();

    let mut used = difference(
        &used_tags(graph, engine, &comparison.learn)?,
        &used_tags(graph, engine, &comparison.direct)?,
    );
    if let Some(key) = used.keys().find(|key| !rules.contains(key)) {
        return Err(Error::UnknownUsedRule(key.to_string()));
    }
    let norm2: f64 = used.values().map(TagUsage::norm2).sum();

    let mut adjustment = Adjustment::default();
    let mut new_factor = 1.0;

    if norm2 > 0.0 {
        let (old_factor, explore_factor) = if not_improved > config.stagnation_patience {
            (config.explore_old_factor, config.explore_new_factor)
        } else {
            (1.0, 0.0)
        };
        new_factor = explore_factor;

        let compensation = compensate(rules, &mut used, norm2, error, old_factor);
        adjustment.changed = compensation.changed;
        if compensation.residual > 0.0 {
            new_factor += compensation.residual / error;
            debug!(
                "Adding remaining error {} to new rule budget, factor now {new_factor}",
                compensation.residual
            );
        }
    }

    if new_factor > 0.0 {
        adjustment.introduced = introduce(rules, &candidates, error * new_factor);
    }
    Ok(adjustment)
}

/// Distributes `error * factor` over the rules in `used`, proportional to
/// each rule's usage difference and normalized by `norm2`, the squared norm
/// of all differences.
///
/// A weight that would turn negative is clamped to zero. Its share drops
/// out of the norm and the unabsorbed part is redistributed in another pass
/// over the remaining rules.
pub(crate) fn compensate(
    rules: &mut RuleSet,
    used: &mut UsageProfile,
    mut norm2: f64,
    error: f64,
    factor: f64,
) -> Compensation {
    let mut residual = error;
    let mut changed = 0;

    while norm2 > 0.0 && residual > 0.0 {
        let mut next_norm2 = norm2;
        let mut next_residual = 0.0;

        for (key, usage) in used.iter_mut() {
            let Some(weight) = rules.get(key) else {
                continue;
            };
            let mut distance = weight.distance - residual * factor * usage.length / norm2;
            let mut fixed = weight.fixed - residual * factor * usage.count / norm2;

            if distance < 0.0 {
                next_norm2 -= usage.length * usage.length;
                next_residual += -distance * usage.length;
                usage.length = 0.0;
                distance = 0.0;
                trace!("Cannot compensate {key} by distance, residual now {next_residual}");
            }
            if fixed < 0.0 {
                next_norm2 -= usage.count * usage.count;
                next_residual += -fixed * usage.count;
                usage.count = 0.0;
                fixed = 0.0;
                trace!("Cannot compensate {key} by fixed penalty, residual now {next_residual}");
            }

            let updated = Weight::new(distance, fixed);
            if updated != weight {
                debug!(
                    "Changing rule {key} from ({}, {}) to ({distance}, {fixed})",
                    weight.distance, weight.fixed
                );
                rules.set(key.clone(), updated);
                changed += 1;
            }
        }

        residual = next_residual;
        norm2 = next_norm2;
    }

    Compensation {
        residual: if norm2 <= 0.0 && residual > 0.0 {
            residual
        } else {
            0.0
        },
        changed,
    }
}

/// Introduces rules for the candidates the direct route over-uses most,
/// spending `budget` on them. Returns the number of rules added.
///
/// The best way-scoped candidate is ranked by length difference and the
/// best node-scoped one by count difference, slightly favoring shorter
/// conjunctions. A candidate whose relevant difference is not negative is
/// left alone.
pub(crate) fn introduce(rules: &mut RuleSet, candidates: &UsageProfile, budget: f64) -> usize {
    let by_length = rank(candidates, Scope::Way, |usage| usage.length);
    let by_count = rank(candidates, Scope::Node, |usage| usage.count);

    let (Some(&(way_key, way_usage)), Some(&(node_key, node_usage))) =
        (by_length.first(), by_count.first())
    else {
        warn!("There are no candidate rules to add, losing compensation {budget}");
        return 0;
    };
    debug!("Way candidates: {}", summary(&by_length));
    debug!("Node candidates: {}", summary(&by_count));

    let mut added = 0;
    if way_key != node_key {
        if way_usage.length < 0.0 {
            let weight = Weight::new(-(budget / 2.0) / way_usage.length, 0.0);
            add_rule(rules, way_key, weight, way_usage);
            added += 1;
        }
        if node_usage.count < 0.0 {
            let weight = Weight::new(0.0, -(budget / 2.0) / node_usage.count);
            add_rule(rules, node_key, weight, node_usage);
            added += 1;
        }
    } else {
        let usage = way_usage;
        let weight = match (usage.length < 0.0, usage.count < 0.0) {
            (true, true) => Some(Weight::new(
                -(budget / 2.0) / usage.length,
                -(budget / 2.0) / usage.count,
            )),
            (true, false) => Some(Weight::new(-budget / usage.length, 0.0)),
            (false, true) => Some(Weight::new(0.0, -budget / usage.count)),
            (false, false) => None,
        };
        if let Some(weight) = weight {
            add_rule(rules, way_key, weight, usage);
            added += 1;
        }
    }

    if added == 0 {
        trace!("No candidate is over-used by the direct route");
    }
    added
}

fn add_rule(rules: &mut RuleSet, key: &RuleKey, weight: Weight, usage: &TagUsage) {
    debug!(
        "Adding rule {key} with ({}, {}) because of ({}, {})",
        weight.distance, weight.fixed, usage.length, usage.count
    );
    rules.add_rule(key.clone(), weight);
}

/// Candidates in ascending order of their score. Keys lacking `scope`
/// score zero; ties keep key order.
fn rank(
    candidates: &UsageProfile,
    scope: Scope,
    component: impl Fn(&TagUsage) -> f64,
) -> Vec<(&RuleKey, &TagUsage)> {
    let score = |key: &RuleKey, usage: &TagUsage| {
        if key.has_scope(scope) {
            #[allow(clippy::cast_precision_loss)]
            let separators = (key.conjuncts() - 1) as f64;
            component(usage) * (1.0 - separators / 100.0)
        } else {
            0.0
        }
    };
    candidates
        .iter()
        .sorted_by(|(ka, ua), (kb, ub)| score(*ka, *ua).total_cmp(&score(*kb, *ub)))
        .collect()
}

fn summary(ranked: &[(&RuleKey, &TagUsage)]) -> String {
    ranked
        .iter()
        .take(3)
        .map(|(key, usage)| format!("{key} ({}, {})", usage.length, usage.count))
        .join(", ")
}
