use log::info;

use super::learner::LearnerState;

/// Summary of one learning iteration over all training examples
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    /// 1-based iteration number
    pub iteration: usize,
    /// Learner state after the iteration
    pub state: LearnerState,
    pub passed: usize,
    /// Failing examples, unreachable ones included
    pub failed: usize,
    pub unreachable: usize,
    pub total_relative_error: f64,
    pub total_absolute_error: f64,
    pub best_relative_error: f64,
    pub best_absolute_error: f64,
    pub rule_count: usize,
    /// Weight edits and rule introductions made during the iteration
    pub rules_changed: usize,
    /// Iterations since the best absolute error last improved
    pub not_improved: usize,
    pub worst_example: Option<String>,
    pub worst_error: f64,
}

impl IterationReport {
    /// `(best relative error, best absolute error, rule count)`
    pub fn progress(&self) -> (f64, f64, usize) {
        (
            self.best_relative_error,
            self.best_absolute_error,
            self.rule_count,
        )
    }
}

/// Receives a report after every learning iteration
pub trait ProgressReporter {
    fn report(&mut self, report: &IterationReport);
}

impl<F> ProgressReporter for F
where
    F: FnMut(&IterationReport),
{
    fn report(&mut self, report: &IterationReport) {
        self(report);
    }
}

/// Writes iteration summaries to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&mut self, report: &IterationReport) {
        if let Some(worst) = &report.worst_example {
            info!(
                "Iteration {}: worst example '{}' with error {:.4}",
                report.iteration, worst, report.worst_error
            );
        }
        info!(
            "Iteration {}: {} passed, {} failed, relative error {:.4} (best {:.4}), \
            absolute error {:.4} (best {:.4}), not improved {}, {} rules",
            report.iteration,
            report.passed,
            report.failed,
            report.total_relative_error,
            report.best_relative_error,
            report.total_absolute_error,
            report.best_absolute_error,
            report.not_improved,
            report.rule_count
        );
    }
}
