use log::{debug, info, trace, warn};
use rayon::prelude::*;

use super::{
    adjust::adjust_rules,
    example::TrainingExample,
    report::{IterationReport, ProgressReporter},
};
use crate::{
    Error,
    config::LearnerConfig,
    model::GraphModel,
    routing::{Route, Router},
    rules::RuleSet,
};

/// Learner state machine; `Converged` and `Stalled` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnerState {
    Iterating,
    /// Every example passed in the last iteration
    Converged,
    /// The best absolute error stopped improving, or the iteration cap was hit
    Stalled,
}

impl LearnerState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, LearnerState::Iterating)
    }
}

/// Direct and learn route of one example under the same rule set
#[derive(Debug, Clone)]
pub struct Comparison {
    pub direct: Route,
    pub learn: Route,
    /// `learn cost - direct cost`
    pub absolute_error: f64,
    /// Absolute error in percent of the direct cost
    pub relative_error: f64,
}

impl Comparison {
    fn new(direct: Route, learn: Route, epsilon: f64) -> Self {
        let absolute_error = learn.cost - direct.cost;
        let relative_error = absolute_error / (direct.cost + epsilon) * 100.0;
        Self {
            direct,
            learn,
            absolute_error,
            relative_error,
        }
    }

    pub fn passes(&self, threshold: f64) -> bool {
        self.relative_error < threshold
    }
}

/// Evaluation of one example
#[derive(Debug, Clone)]
pub enum ExampleOutcome {
    /// Direct or learn route does not exist
    Unreachable,
    Passed(Comparison),
    Failed(Comparison),
}

impl ExampleOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, ExampleOutcome::Passed(_))
    }
}

/// Final result of a learning run
#[derive(Debug, Clone)]
pub struct LearnOutcome {
    pub state: LearnerState,
    pub iterations: usize,
    pub rules: RuleSet,
}

/// Calibrates a rule set so that each training example's desired route
/// becomes the least-cost route between its ends.
///
/// Rule edits made for one example are visible to the examples after it in
/// the same iteration.
#[derive(Debug)]
pub struct RuleLearner<'a> {
    graph: &'a GraphModel,
    examples: Vec<TrainingExample>,
    skipped: usize,
    config: LearnerConfig,
    rules: RuleSet,
    state: LearnerState,
    iteration: usize,
    best_relative_error: f64,
    best_absolute_error: f64,
    not_improved: usize,
}

impl<'a> RuleLearner<'a> {
    /// Creates a learner starting from an empty rule set. Examples that
    /// reference nodes missing from the graph are dropped with a warning.
    pub fn new(
        graph: &'a GraphModel,
        examples: Vec<TrainingExample>,
        config: LearnerConfig,
    ) -> Self {
        let total = examples.len();
        let examples: Vec<TrainingExample> = examples
            .into_iter()
            .filter(|example| match example.missing_node(graph) {
                Some(node) => {
                    warn!(
                        "Skipping example '{}': node {node} is not part of the map",
                        example.label
                    );
                    false
                }
                None => true,
            })
            .collect();

        Self {
            graph,
            skipped: total - examples.len(),
            examples,
            config,
            rules: RuleSet::new(),
            state: LearnerState::Iterating,
            iteration: 0,
            best_relative_error: f64::INFINITY,
            best_absolute_error: f64::INFINITY,
            not_improved: 1,
        }
    }

    /// Starts learning from `rules` instead of an empty rule set
    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn into_rules(self) -> RuleSet {
        self.rules
    }

    pub fn state(&self) -> LearnerState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Number of examples dropped for referencing unknown nodes
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Runs one iteration over all examples, adjusting rules for every
    /// failing one.
    ///
    /// # Errors
    ///
    /// Fails on a negative edge penalty or when a fired rule is missing
    /// from the rule set. Both mean the rule set is corrupt.
    pub fn step(&mut self) -> Result<IterationReport, Error> {
        let mode = self.config.combine_mode();
        let mut report = IterationReport {
            iteration: self.iteration + 1,
            state: LearnerState::Iterating,
            passed: 0,
            failed: 0,
            unreachable: 0,
            total_relative_error: 0.0,
            total_absolute_error: 0.0,
            best_relative_error: self.best_relative_error,
            best_absolute_error: self.best_absolute_error,
            rule_count: 0,
            rules_changed: 0,
            not_improved: self.not_improved,
            worst_example: None,
            worst_error: 0.0,
        };

        for example in &self.examples {
            let engine = self.rules.compile(mode);
            let router = Router::new(self.graph, &engine);

            let comparison = match compare(&router, example, &self.config)? {
                ExampleOutcome::Unreachable => {
                    warn!("Example '{}' has no route, counting it as failed", example.label);
                    report.failed += 1;
                    report.unreachable += 1;
                    continue;
                }
                ExampleOutcome::Passed(comparison) => {
                    trace!(
                        "Example '{}' passed with cost {}",
                        example.label, comparison.direct.cost
                    );
                    report.passed += 1;
                    report.total_relative_error += comparison.relative_error;
                    report.total_absolute_error += comparison.absolute_error;
                    continue;
                }
                ExampleOutcome::Failed(comparison) => comparison,
            };

            debug!(
                "Example '{}' failed with cost {} by {:.2}% ({:.8})",
                example.label,
                comparison.direct.cost,
                comparison.relative_error,
                comparison.absolute_error
            );
            report.failed += 1;
            report.total_relative_error += comparison.relative_error;
            report.total_absolute_error += comparison.absolute_error;
            if comparison.absolute_error > report.worst_error {
                report.worst_error = comparison.absolute_error;
                report.worst_example = Some(example.label.clone());
            }

            let adjustment = adjust_rules(
                self.graph,
                &engine,
                &mut self.rules,
                &comparison,
                &self.config,
                self.not_improved,
            )?;
            report.rules_changed += adjustment.changed + adjustment.introduced;
            if adjustment.introduced > 0 {
                self.not_improved = 0;
            }
        }

        self.iteration += 1;
        if report.total_relative_error < self.best_relative_error {
            self.best_relative_error = report.total_relative_error;
        }
        if report.total_absolute_error < self.best_absolute_error {
            self.best_absolute_error = report.total_absolute_error;
            self.not_improved = 0;
        } else {
            self.not_improved += 1;
        }

        self.state = if report.failed == 0 {
            LearnerState::Converged
        } else if self.not_improved > self.config.stall_limit {
            LearnerState::Stalled
        } else if self
            .config
            .max_iterations
            .is_some_and(|max| self.iteration >= max)
        {
            info!("Reached iteration cap of {}", self.iteration);
            LearnerState::Stalled
        } else {
            LearnerState::Iterating
        };

        report.state = self.state;
        report.best_relative_error = self.best_relative_error;
        report.best_absolute_error = self.best_absolute_error;
        report.rule_count = self.rules.len();
        report.not_improved = self.not_improved;
        Ok(report)
    }

    /// Iterates until the learner converges or stalls, passing every
    /// iteration's report to `reporter`.
    pub fn run<R: ProgressReporter>(&mut self, reporter: &mut R) -> Result<LearnOutcome, Error> {
        info!(
            "Learning rules from {} examples ({} skipped)",
            self.examples.len(),
            self.skipped
        );
        while !self.state.is_terminal() {
            let report = self.step()?;
            reporter.report(&report);
        }

        info!(
            "Learning finished as {:?} after {} iterations with {} rules",
            self.state,
            self.iteration,
            self.rules.len()
        );
        for (key, weight) in self.rules.significant() {
            info!("{key}: ({}, {})", weight.distance, weight.fixed);
        }

        Ok(LearnOutcome {
            state: self.state,
            iterations: self.iteration,
            rules: self.rules.clone(),
        })
    }

    /// Scores every example against the current rules without changing
    /// them. Results are in example order.
    pub fn evaluate(&self) -> Result<Vec<ExampleOutcome>, Error> {
        let engine = self.rules.compile(self.config.combine_mode());
        let router = Router::new(self.graph, &engine);
        self.examples
            .par_iter()
            .map(|example| compare(&router, example, &self.config))
            .collect()
    }
}

/// Routes one example directly and through its via nodes
fn compare(
    router: &Router<'_>,
    example: &TrainingExample,
    config: &LearnerConfig,
) -> Result<ExampleOutcome, Error> {
    let Some(direct) = router.multi_route(&example.direct_waypoints())? else {
        return Ok(ExampleOutcome::Unreachable);
    };
    let Some(learn) = router.multi_route(&example.learn_waypoints())? else {
        return Ok(ExampleOutcome::Unreachable);
    };

    let comparison = Comparison::new(direct, learn, config.epsilon);
    Ok(if comparison.passes(config.pass_threshold) {
        ExampleOutcome::Passed(comparison)
    } else {
        ExampleOutcome::Failed(comparison)
    })
}
