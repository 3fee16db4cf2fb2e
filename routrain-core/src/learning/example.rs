use serde::{Deserialize, Serialize};

use crate::{NodeId, model::GraphModel};

/// Desired route from `start` to `end` passing through `via` in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub start: NodeId,
    pub end: NodeId,
    #[serde(default)]
    pub via: Vec<NodeId>,
    #[serde(default)]
    pub label: String,
}

impl TrainingExample {
    pub fn new(start: NodeId, end: NodeId, via: Vec<NodeId>, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            via,
            label: label.into(),
        }
    }

    /// Waypoints of the unconstrained route
    pub fn direct_waypoints(&self) -> [NodeId; 2] {
        [self.start, self.end]
    }

    /// Waypoints of the desired route
    pub fn learn_waypoints(&self) -> Vec<NodeId> {
        let mut waypoints = Vec::with_capacity(self.via.len() + 2);
        waypoints.push(self.start);
        waypoints.extend_from_slice(&self.via);
        waypoints.push(self.end);
        waypoints
    }

    /// First waypoint missing from the graph, if any
    pub fn missing_node(&self, graph: &GraphModel) -> Option<NodeId> {
        self.learn_waypoints()
            .into_iter()
            .find(|node| !graph.contains_node(*node))
    }
}
