//! Least-cost pedestrian routing priced by a [`RuleEngine`]

mod astar;
mod path;
mod to_geojson;

use log::warn;

pub use path::{PathStep, Route};

use crate::{Error, NodeId, model::GraphModel, rules::RuleEngine};

/// Routes over a graph with edge costs from a compiled rule set.
///
/// Holds no mutable search state, so one router can serve queries from
/// several threads.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    graph: &'a GraphModel,
    engine: &'a RuleEngine,
}

impl<'a> Router<'a> {
    pub fn new(graph: &'a GraphModel, engine: &'a RuleEngine) -> Self {
        Self { graph, engine }
    }

    /// Least-cost route from `start` to `goal`.
    ///
    /// Returns `Ok(None)` when the goal is unreachable.
    ///
    /// # Errors
    ///
    /// Fails on unknown node ids and on a negative edge penalty.
    pub fn route(&self, start: NodeId, goal: NodeId) -> Result<Option<Route>, Error> {
        let route = astar::astar_route(self.graph, self.engine, start, goal)?;
        if route.is_none() {
            warn!("No route from node {start} to node {goal}");
        }
        Ok(route)
    }

    /// Concatenation of single-pair routes between consecutive waypoints.
    ///
    /// Costs are summed and steps appended, each leg keeping its own seeded
    /// first step. Unreachable if any leg is unreachable.
    pub fn multi_route(&self, waypoints: &[NodeId]) -> Result<Option<Route>, Error> {
        let mut total = Route::default();
        for pair in waypoints.windows(2) {
            match self.route(pair[0], pair[1])? {
                Some(leg) => total.append(leg),
                None => return Ok(None),
            }
        }
        Ok(Some(total))
    }
}
