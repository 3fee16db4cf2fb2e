use std::{path::Path, time::Instant};

use geojson::{FeatureCollection, GeoJson};
use routrain_core::prelude::*;
use tracing::{info, warn};

use crate::{config::AppConfig, error::AppError};

/// Forwards learner progress to `tracing` as structured events
fn trace_progress(report: &IterationReport) {
    info!(
        iteration = report.iteration,
        passed = report.passed,
        failed = report.failed,
        unreachable = report.unreachable,
        relative_error = report.total_relative_error,
        absolute_error = report.total_absolute_error,
        rules = report.rule_count,
        changed = report.rules_changed,
        worst = report.worst_example.as_deref().unwrap_or("-"),
        "iteration finished"
    );
}

pub fn train(config_path: &Path) -> Result<(), AppError> {
    let config = AppConfig::from_file(config_path)?;
    let started = Instant::now();

    let graph = load_graph(&config.graph)?;
    let examples = load_training(&config.training)?;
    let rules = match &config.initial_rules {
        Some(path) => load_rules(path)?,
        None => RuleSet::new(),
    };

    let mut learner =
        RuleLearner::new(&graph, examples, config.learner.clone()).with_rules(rules);
    let mut reporter = |report: &IterationReport| trace_progress(report);
    let outcome = learner.run(&mut reporter)?;

    match outcome.state {
        LearnerState::Converged => info!(
            iterations = outcome.iterations,
            "all examples reproduced"
        ),
        state => warn!(
            ?state,
            iterations = outcome.iterations,
            "learning stopped before every example passed"
        ),
    }

    save_rules(&config.rules_out, &outcome.rules)?;

    if let Some(path) = &config.geojson_out {
        let engine = outcome.rules.compile(config.learner.combine_mode());
        let router = Router::new(&graph, &engine);
        let mut features = Vec::with_capacity(learner.examples().len());
        for example in learner.examples() {
            match router.multi_route(&example.direct_waypoints())? {
                Some(route) => {
                    let mut feature = route.to_geojson(&graph)?;
                    feature.set_property("label", example.label.clone());
                    features.push(feature);
                }
                None => warn!(label = %example.label, "no route to export"),
            }
        }
        let collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };
        write_text(path, &GeoJson::from(collection).to_string())?;
        info!(path = %path.display(), "exported learned routes");
    }

    info!(elapsed = ?started.elapsed(), "training done");
    Ok(())
}

pub struct RouteArgs<'a> {
    pub graph: &'a Path,
    pub rules: Option<&'a Path>,
    pub mode: CombineMode,
    pub waypoints: &'a [NodeId],
    pub output: Option<&'a Path>,
}

pub fn route(args: RouteArgs<'_>) -> Result<(), AppError> {
    let graph = load_graph(args.graph)?;
    let rules = match args.rules {
        Some(path) => load_rules(path)?,
        None => RuleSet::new(),
    };
    let engine = rules.compile(args.mode);
    let router = Router::new(&graph, &engine);

    let Some(route) = router.multi_route(args.waypoints)? else {
        return Err(AppError::NoRoute(args.waypoints.to_vec()));
    };
    info!(
        cost = route.cost,
        length = route.length(),
        steps = route.len(),
        "route found"
    );

    let text = route.to_geojson_string(&graph)?;
    match args.output {
        Some(path) => write_text(path, &text),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn write_text(path: &Path, text: &str) -> Result<(), AppError> {
    std::fs::write(path, text).map_err(|source| AppError::Write {
        path: path.display().to_string(),
        source,
    })
}
