use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use routrain_core::prelude::*;

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Square grid where every third row is a footway and the rest are
/// residential streets without sidewalk.
fn build_grid(size: i64) -> GraphModel {
    let id = |row: i64, col: i64| row * size + col;
    let mut builder = GraphBuilder::with_capacity((size * size) as usize, (2 * size) as usize);
    for row in 0..size {
        for col in 0..size {
            let node_tags = if (row + col) % 7 == 0 {
                tags(&[("highway", "crossing"), ("crossing", "zebra")])
            } else {
                Tags::new()
            };
            builder
                .add_node(
                    id(row, col),
                    49.0 + 0.0005 * row as f64,
                    8.0 + 0.0007 * col as f64,
                    node_tags,
                )
                .unwrap();
        }
    }
    for row in 0..size {
        let way_tags = if row % 3 == 0 {
            tags(&[("highway", "footway")])
        } else {
            tags(&[("highway", "residential"), ("sidewalk", "no")])
        };
        let nodes = (0..size).map(|col| id(row, col)).collect();
        builder.add_way(row, nodes, way_tags).unwrap();
    }
    for col in 0..size {
        let nodes = (0..size).map(|row| id(row, col)).collect();
        builder
            .add_way(size + col, nodes, tags(&[("highway", "residential"), ("sidewalk", "both")]))
            .unwrap();
    }
    builder.build().unwrap()
}

fn bench_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    for (key, distance, fixed) in [
        ("W:highway==residential", 0.2, 0.0),
        ("W:highway==residential && W:sidewalk==no", 1.5, 0.0),
        ("N:crossing==zebra", 0.0, 15.0),
    ] {
        rules.add_rule(key.parse().unwrap(), Weight::new(distance, fixed));
    }
    rules
}

fn bench_route(c: &mut Criterion) {
    let rules = bench_rules();
    let mut group = c.benchmark_group("route");

    for size in [20_i64, 60] {
        let graph = build_grid(size);
        let goal = size * size - 1;
        for mode in [CombineMode::Override, CombineMode::Additive] {
            let engine = rules.compile(mode);
            let router = Router::new(&graph, &engine);
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}"), size),
                &goal,
                |b, &goal| b.iter(|| black_box(router.route(black_box(0), goal).unwrap())),
            );
        }
    }

    group.finish();
}

fn bench_learning_step(c: &mut Criterion) {
    let graph = build_grid(20);
    let examples: Vec<TrainingExample> = (1..10)
        .map(|row| {
            TrainingExample::new(
                row * 20,
                row * 20 + 19,
                vec![row * 20 + 10],
                format!("row {row}"),
            )
        })
        .collect();

    c.bench_function("learning_step", |b| {
        b.iter(|| {
            let mut learner = RuleLearner::new(&graph, examples.clone(), LearnerConfig::default())
                .with_rules(bench_rules());
            black_box(learner.step().unwrap())
        })
    });
}

criterion_group!(benches, bench_route, bench_learning_step);
criterion_main!(benches);
