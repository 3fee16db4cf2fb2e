//! Map graph with O(1) lookup by OSM id

use geo::Point;
use hashbrown::HashMap;
use petgraph::{
    graph::{DiGraph, EdgeReference, NodeIndex},
    visit::EdgeRef,
};

use super::components::{MapNode, MapWay, StreetEdge};
use crate::{Error, NodeId, WayId};

/// Routable map graph, immutable once built by the loader.
///
/// Every edge references a way present in `ways`, and every node referenced
/// by a way is present in the graph.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    pub(crate) graph: DiGraph<MapNode, StreetEdge>,
    pub(crate) node_index: HashMap<NodeId, NodeIndex>,
    pub(crate) ways: HashMap<WayId, MapWay>,
}

impl GraphModel {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&MapNode> {
        self.node_index.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn way(&self, id: WayId) -> Option<&MapWay> {
        self.ways.get(&id)
    }

    /// Node lookup failing with [`Error::UnknownNode`]
    pub fn try_node(&self, id: NodeId) -> Result<&MapNode, Error> {
        self.node(id).ok_or(Error::UnknownNode(id))
    }

    /// Way lookup failing with [`Error::UnknownWay`]
    pub fn try_way(&self, id: WayId) -> Result<&MapWay, Error> {
        self.way(id).ok_or(Error::UnknownWay(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MapNode> {
        self.graph.node_weights()
    }

    /// Coordinates of a node, used by trajectory exporters
    pub fn coordinates(&self, id: NodeId) -> Option<Point<f64>> {
        self.node(id).map(|node| node.geometry)
    }

    /// `(way, neighbor)` pairs reachable in one step from `id`, in the
    /// order of [`GraphModel::node_ways`]
    pub fn adjacent(&self, id: NodeId) -> Vec<(WayId, NodeId)> {
        let Some(&idx) = self.node_index.get(&id) else {
            return Vec::new();
        };
        self.out_edges(idx)
            .map(|edge| (edge.weight().way, self.graph[edge.target()].id))
            .collect()
    }

    /// Way membership of a node with the 0-2 neighbors reachable along
    /// each way, in load order.
    pub fn node_ways(&self, id: NodeId) -> Vec<(WayId, Vec<NodeId>)> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        node.ways
            .iter()
            .filter_map(|way_id| self.ways.get(way_id))
            .map(|way| (way.id, way.neighbors_of(id)))
            .collect()
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_index.get(&id).copied()
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> &MapNode {
        &self.graph[idx]
    }

    /// Outgoing edges in load order: the node's ways as loaded, and within
    /// a way the previous node before the next one.
    ///
    /// petgraph yields a node's edges newest first, and the builder adds
    /// them in load order, so the list is reversed.
    pub(crate) fn out_edges(
        &self,
        idx: NodeIndex,
    ) -> impl Iterator<Item = EdgeReference<'_, StreetEdge>> {
        let edges: Vec<_> = self.graph.edges(idx).collect();
        edges.into_iter().rev()
    }
}
