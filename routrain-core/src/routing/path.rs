use crate::{NodeId, WayId};

/// Edge entered to reach `node`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub way: WayId,
    pub node: NodeId,
    /// Penalized cost of the segment
    pub cost: f64,
    /// Physical length of the segment in meters
    pub length: f64,
}

/// Route as an ordered list of steps.
///
/// The first step of each searched leg is a zero-cost, zero-length step onto
/// the leg's start node along one of its ways.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub cost: f64,
    pub steps: Vec<PathStep>,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Node sequence, e.g. for trajectory export
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.steps.iter().map(|step| step.node).collect()
    }

    /// Physical length in meters
    pub fn length(&self) -> f64 {
        self.steps.iter().map(|step| step.length).sum()
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.steps.last().map(|step| step.node)
    }

    pub(crate) fn append(&mut self, leg: Route) {
        self.cost += leg.cost;
        self.steps.extend(leg.steps);
    }
}
