//! Calibration of a rule set from example routes
//!
//! Each training example names a start, an end and the nodes the desired
//! route passes through. The learner repeatedly compares the cheapest
//! unconstrained route with the desired one and shifts rule weights until
//! the desired route is the cheapest for every example, or progress stalls.

mod adjust;
mod example;
mod learner;
mod report;

pub use example::TrainingExample;
pub use learner::{Comparison, ExampleOutcome, LearnOutcome, LearnerState, RuleLearner};
pub use report::{IterationReport, LogReporter, ProgressReporter};
