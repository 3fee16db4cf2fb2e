use thiserror::Error;

use crate::{NodeId, WayId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown node id {0}")]
    UnknownNode(NodeId),
    #[error("Unknown way id {0}")]
    UnknownWay(WayId),
    #[error("Way {way} references node {node} which is not part of the map")]
    MissingWayNode { way: WayId, node: NodeId },
    #[error("Invalid rule key '{0}'")]
    InvalidRule(String),
    #[error(
        "Negative penalty (distance {distance}, fixed {fixed}) from node {from} to node {to} on way {way}"
    )]
    NegativePenalty {
        from: NodeId,
        to: NodeId,
        way: WayId,
        distance: f64,
        fixed: f64,
    },
    #[error("Rule '{0}' fired on a route but is missing from the rule set")]
    UnknownUsedRule(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

impl Error {
    /// Whether the error reports a broken rule set or attribution invariant
    /// rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Error::NegativePenalty { .. } | Error::UnknownUsedRule(_)
        )
    }
}
