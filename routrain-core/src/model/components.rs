//! Graph components - nodes, ways and the directed edges between nodes

use geo::Point;

use crate::{NodeId, Tags, WayId};

/// Map node
#[derive(Debug, Clone)]
pub struct MapNode {
    /// OSM ID of the node
    pub id: NodeId,
    /// Node coordinates, `x` is longitude and `y` latitude
    pub geometry: Point<f64>,
    pub tags: Tags,
    /// Routable ways through this node, in load order
    pub ways: Vec<WayId>,
}

impl MapNode {
    pub fn new(id: NodeId, lat: f64, lon: f64, tags: Tags) -> Self {
        Self {
            id,
            geometry: Point::new(lon, lat),
            tags,
            ways: Vec::new(),
        }
    }

    pub fn lat(&self) -> f64 {
        self.geometry.y()
    }

    pub fn lon(&self) -> f64 {
        self.geometry.x()
    }

    pub fn osm_url(&self) -> String {
        format!("https://www.openstreetmap.org/node/{}", self.id)
    }
}

/// Routable way
#[derive(Debug, Clone)]
pub struct MapWay {
    /// OSM ID of the way
    pub id: WayId,
    /// Node sequence forming the way geometry
    pub nodes: Vec<NodeId>,
    pub tags: Tags,
}

impl MapWay {
    pub fn new(id: WayId, nodes: Vec<NodeId>, tags: Tags) -> Self {
        Self { id, nodes, tags }
    }

    /// Nodes directly reachable from `node` along this way: the previous
    /// and the next node of every occurrence of `node` in the sequence.
    pub fn neighbors_of(&self, node: NodeId) -> Vec<NodeId> {
        let mut neighbors = Vec::with_capacity(2);
        for (pos, _) in self.nodes.iter().enumerate().filter(|(_, n)| **n == node) {
            if pos > 0 {
                neighbors.push(self.nodes[pos - 1]);
            }
            if let Some(&next) = self.nodes.get(pos + 1) {
                neighbors.push(next);
            }
        }
        neighbors.dedup();
        neighbors
    }

    pub fn osm_url(&self) -> String {
        format!("https://www.openstreetmap.org/way/{}", self.id)
    }
}

/// Directed street segment between two consecutive way nodes
#[derive(Debug, Clone, Copy)]
pub struct StreetEdge {
    /// Way the segment belongs to
    pub way: WayId,
    /// Great-circle length in meters
    pub length: f64,
}
