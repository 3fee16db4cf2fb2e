mod state;

use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::{HashMap, hash_map::Entry};
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use self::state::State;
use super::{PathStep, Route};
use crate::{
    Error, NodeId,
    model::{GraphModel, great_circle_distance},
    rules::RuleEngine,
};

/// Best known way to reach a node
#[derive(Debug, Clone, Copy)]
struct Label {
    cost: f64,
    predecessor: Option<NodeIndex>,
    step: PathStep,
}

/// A* search from `start` to `goal` with edge costs from `engine`.
///
/// The heuristic is the great-circle distance to the goal. Edge costs never
/// fall below the segment length, so it never overestimates. Stale frontier
/// entries are skipped on pop instead of being decreased in place.
pub(super) fn astar_route(
    graph: &GraphModel,
    engine: &RuleEngine,
    start: NodeId,
    goal: NodeId,
) -> Result<Option<Route>, Error> {
    let start_idx = graph.index_of(start).ok_or(Error::UnknownNode(start))?;
    let goal_idx = graph.index_of(goal).ok_or(Error::UnknownNode(goal))?;
    let start_node = graph.node_at(start_idx);
    let goal_point = graph.node_at(goal_idx).geometry;

    // The first step needs a way for the penalty context of later steps
    let Some(&first_way) = start_node.ways.first() else {
        return Ok(None);
    };

    let estimated_nodes = graph.node_count().min(1000);
    let mut labels: HashMap<NodeIndex, Label> = HashMap::with_capacity(estimated_nodes);
    let mut closed = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);
    let mut seq = 0_u64;

    labels.insert(
        start_idx,
        Label {
            cost: 0.0,
            predecessor: None,
            step: PathStep {
                way: first_way,
                node: start,
                cost: 0.0,
                length: 0.0,
            },
        },
    );
    heap.push(State {
        estimate: 0.0,
        seq,
        node: start_idx,
    });

    while let Some(State { node, .. }) = heap.pop() {
        // Stale duplicate of an already finalized node
        if closed.contains(node.index()) {
            continue;
        }
        if node == goal_idx {
            return Ok(Some(reconstruct(&labels, goal_idx)));
        }
        closed.insert(node.index());

        let current_cost = labels[&node].cost;
        let current = graph.node_at(node);

        // Neighbor order decides equal-cost ties
        for edge in graph.out_edges(node) {
            let next = edge.target();
            if closed.contains(next.index()) {
                continue;
            }
            let street = edge.weight();
            let way = graph.try_way(street.way)?;
            let next_node = graph.node_at(next);

            let segment_cost = engine.segment_cost(current, next_node, way, street.length)?;
            let next_cost = current_cost + segment_cost;

            let label = Label {
                cost: next_cost,
                predecessor: Some(node),
                step: PathStep {
                    way: way.id,
                    node: next_node.id,
                    cost: segment_cost,
                    length: street.length,
                },
            };
            match labels.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(label);
                }
                Entry::Occupied(mut entry) => {
                    if entry.get().cost < next_cost {
                        continue;
                    }
                    *entry.get_mut() = label;
                }
            }

            seq += 1;
            heap.push(State {
                estimate: next_cost + great_circle_distance(next_node.geometry, goal_point),
                seq,
                node: next,
            });
        }
    }

    Ok(None)
}

fn reconstruct(labels: &HashMap<NodeIndex, Label>, goal: NodeIndex) -> Route {
    let mut steps = Vec::new();
    let mut current = Some(goal);
    while let Some(idx) = current {
        let label = &labels[&idx];
        steps.push(label.step);
        current = label.predecessor;
    }
    steps.reverse();

    Route {
        cost: labels[&goal].cost,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Tags,
        loading::GraphBuilder,
        rules::{CombineMode, RuleSet, Weight},
    };

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    /// Square 1-2-3 (north side, residential) and 1-4-3 (south side, footway)
    fn square() -> GraphModel {
        let mut b = GraphBuilder::new();
        b.add_node(1, 49.000, 8.000, Tags::new()).unwrap();
        b.add_node(2, 49.001, 8.001, Tags::new()).unwrap();
        b.add_node(3, 49.000, 8.002, Tags::new()).unwrap();
        b.add_node(4, 48.9995, 8.001, Tags::new()).unwrap();
        b.add_node(5, 49.010, 8.010, Tags::new()).unwrap();
        b.add_way(10, vec![1, 2, 3], tags(&[("highway", "residential")]))
            .unwrap();
        b.add_way(11, vec![1, 4, 3], tags(&[("highway", "footway")]))
            .unwrap();
        b.build().unwrap()
    }

    fn engine(entries: &[(&str, (f64, f64))]) -> RuleEngine {
        entries
            .iter()
            .map(|(key, weight)| (key.parse().unwrap(), Weight::from(*weight)))
            .collect::<RuleSet>()
            .compile(CombineMode::Override)
    }

    #[test]
    fn finds_shortest_path_without_rules() {
        let graph = square();
        let route = astar_route(&graph, &engine(&[]), 1, 3).unwrap().unwrap();
        assert_eq!(route.node_ids(), vec![1, 4, 3]);
        assert_eq!(route.last_node(), Some(3));
        assert_eq!(route.steps[0].way, 10);
        assert_eq!(route.steps[0].cost, 0.0);
    }

    #[test]
    fn equal_cost_tie_goes_to_later_loaded_way() {
        // mirror-image paths 1-2-4 and 1-3-4 across the equator
        let mut b = GraphBuilder::new();
        b.add_node(1, 0.0, 0.000, Tags::new()).unwrap();
        b.add_node(2, 0.001, 0.001, Tags::new()).unwrap();
        b.add_node(3, -0.001, 0.001, Tags::new()).unwrap();
        b.add_node(4, 0.0, 0.002, Tags::new()).unwrap();
        b.add_way(10, vec![1, 2, 4], tags(&[("highway", "footway")]))
            .unwrap();
        b.add_way(11, vec![1, 3, 4], tags(&[("highway", "footway")]))
            .unwrap();
        let graph = b.build().unwrap();

        let route = astar_route(&graph, &engine(&[]), 1, 4).unwrap().unwrap();
        // 2 is expanded first, then 3 replaces the equal-cost label of 4
        assert_eq!(route.node_ids(), vec![1, 3, 4]);
        assert_eq!(route.steps[1].way, 11);
    }

    #[test]
    fn penalties_divert_the_route() {
        let graph = square();
        let engine = engine(&[("W:highway==footway", (1.0, 0.0))]);
        let route = astar_route(&graph, &engine, 1, 3).unwrap().unwrap();
        assert_eq!(route.node_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn cost_equals_sum_of_step_costs() {
        let graph = square();
        let engine = engine(&[("W:highway==residential", (0.3, 2.0))]);
        let route = astar_route(&graph, &engine, 2, 4).unwrap().unwrap();
        let summed = route.steps.iter().fold(0.0, |acc, step| acc + step.cost);
        assert_eq!(route.cost, summed);
        assert_eq!(route.last_node(), Some(4));
    }

    #[test]
    fn start_equals_goal_yields_seeded_step() {
        let graph = square();
        let route = astar_route(&graph, &engine(&[]), 2, 2).unwrap().unwrap();
        assert_eq!(route.cost, 0.0);
        assert_eq!(route.node_ids(), vec![2]);
    }

    #[test]
    fn isolated_goal_is_unreachable() {
        let graph = square();
        assert!(astar_route(&graph, &engine(&[]), 1, 5).unwrap().is_none());
        assert!(astar_route(&graph, &engine(&[]), 5, 1).unwrap().is_none());
    }

    #[test]
    fn unknown_node_is_an_error() {
        let graph = square();
        let err = astar_route(&graph, &engine(&[]), 1, 99).unwrap_err();
        assert!(matches!(err, Error::UnknownNode(99)));
    }

    #[test]
    fn heuristic_never_exceeds_route_cost() {
        let graph = square();
        let engine = engine(&[("W:highway==footway", (0.5, 1.0))]);
        for from in 1..=4 {
            for to in 1..=4 {
                let route = astar_route(&graph, &engine, from, to).unwrap().unwrap();
                let straight = great_circle_distance(
                    graph.coordinates(from).unwrap(),
                    graph.coordinates(to).unwrap(),
                );
                assert!(straight <= route.cost + 1e-9, "{from}->{to}");
            }
        }
    }
}
