#![allow(dead_code)]

use routrain_core::prelude::*;

pub const A: NodeId = 1;
pub const B: NodeId = 2;
pub const C: NodeId = 3;
pub const D: NodeId = 4;
pub const ISOLATED: NodeId = 5;

pub fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// A-B-C-D footway bowing north, and a shorter straight residential street
/// A-D without sidewalk. Node 5 lies on no way.
pub fn detour_graph() -> GraphModel {
    let mut builder = GraphBuilder::new();
    builder.add_node(A, 49.000, 8.000, Tags::new()).unwrap();
    builder.add_node(B, 49.003, 8.003, Tags::new()).unwrap();
    builder.add_node(C, 49.003, 8.007, Tags::new()).unwrap();
    builder.add_node(D, 49.000, 8.010, Tags::new()).unwrap();
    builder.add_node(ISOLATED, 49.010, 8.020, Tags::new()).unwrap();
    builder
        .add_way(100, vec![A, B, C, D], tags(&[("highway", "footway")]))
        .unwrap();
    builder
        .add_way(
            200,
            vec![A, D],
            tags(&[("highway", "residential"), ("sidewalk", "no")]),
        )
        .unwrap();
    builder.build().unwrap()
}

/// 4x4 grid of residential streets with a footway along the middle row
/// and a signalized crossing at its centre.
pub fn grid_graph() -> GraphModel {
    let mut builder = GraphBuilder::new();
    let id = |row: i64, col: i64| 100 + row * 10 + col;
    for row in 0..4 {
        for col in 0..4 {
            let node_tags = if (row, col) == (1, 1) {
                tags(&[("crossing", "traffic_signals"), ("highway", "crossing")])
            } else {
                Tags::new()
            };
            builder
                .add_node(
                    id(row, col),
                    49.0 + 0.001 * row as f64,
                    8.0 + 0.0015 * col as f64,
                    node_tags,
                )
                .unwrap();
        }
    }
    let mut way_id = 1000;
    for row in 0..4 {
        let kind = if row == 1 { "footway" } else { "residential" };
        builder
            .add_way(
                way_id,
                (0..4).map(|col| id(row, col)).collect(),
                tags(&[("highway", kind)]),
            )
            .unwrap();
        way_id += 1;
    }
    for col in 0..4 {
        builder
            .add_way(
                way_id,
                (0..4).map(|row| id(row, col)).collect(),
                tags(&[("highway", "residential"), ("sidewalk", "both")]),
            )
            .unwrap();
        way_id += 1;
    }
    builder.build().unwrap()
}

pub fn rule_set(entries: &[(&str, (f64, f64))]) -> RuleSet {
    entries
        .iter()
        .map(|(key, weight)| (key.parse().unwrap(), Weight::from(*weight)))
        .collect()
}

pub fn key(text: &str) -> RuleKey {
    text.parse().unwrap()
}
