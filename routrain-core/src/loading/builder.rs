use hashbrown::HashMap;
use log::{debug, info};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::{
    Error, NodeId, Tags, WayId,
    model::{GraphModel, MapNode, MapWay, StreetEdge, great_circle_distance},
};

/// Ways without this tag are not routable and are left out of the graph
pub const ROUTABLE_TAG: &str = "highway";
const SIDEWALK_TAG: &str = "sidewalk";

/// Incrementally collects nodes and ways and builds a [`GraphModel`].
///
/// Nodes must be added before the ways that reference them.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DiGraph<MapNode, StreetEdge>,
    node_index: HashMap<NodeId, NodeIndex>,
    ways: HashMap<WayId, MapWay>,
    skipped_ways: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, ways: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, ways * 2),
            node_index: HashMap::with_capacity(nodes),
            ways: HashMap::with_capacity(ways),
            skipped_ways: 0,
        }
    }

    /// Adds a node, `lat`/`lon` in degrees
    pub fn add_node(
        &mut self,
        id: NodeId,
        lat: f64,
        lon: f64,
        tags: Tags,
    ) -> Result<&mut Self, Error> {
        if self.node_index.contains_key(&id) {
            return Err(Error::InvalidData(format!("Duplicate node id {id}")));
        }
        let idx = self.graph.add_node(MapNode::new(id, lat, lon, tags));
        self.node_index.insert(id, idx);
        Ok(self)
    }

    /// Adds a way and links its consecutive nodes in both directions.
    ///
    /// Ways lacking a `highway` tag are silently dropped. A missing
    /// `sidewalk` tag is normalized to `sidewalk=unknown`.
    pub fn add_way(
        &mut self,
        id: WayId,
        nodes: Vec<NodeId>,
        mut tags: Tags,
    ) -> Result<&mut Self, Error> {
        if !tags.contains_key(ROUTABLE_TAG) {
            self.skipped_ways += 1;
            return Ok(self);
        }
        if nodes.is_empty() {
            return Err(Error::InvalidData(format!("Way {id} has no nodes")));
        }
        if self.ways.contains_key(&id) {
            return Err(Error::InvalidData(format!("Duplicate way id {id}")));
        }

        let indices = nodes
            .iter()
            .map(|node| {
                self.node_index
                    .get(node)
                    .copied()
                    .ok_or(Error::MissingWayNode { way: id, node: *node })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tags.entry(SIDEWALK_TAG.to_string())
            .or_insert_with(|| "unknown".to_string());

        for &idx in &indices {
            let node = &mut self.graph[idx];
            if !node.ways.contains(&id) {
                node.ways.push(id);
            }
        }

        for pair in indices.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                continue;
            }
            let length = great_circle_distance(self.graph[a].geometry, self.graph[b].geometry);
            self.graph.add_edge(a, b, StreetEdge { way: id, length });
            self.graph.add_edge(b, a, StreetEdge { way: id, length });
        }

        self.ways.insert(id, MapWay::new(id, nodes, tags));
        Ok(self)
    }

    pub fn build(self) -> Result<GraphModel, Error> {
        if self.skipped_ways > 0 {
            debug!("Skipped {} ways without a {ROUTABLE_TAG} tag", self.skipped_ways);
        }
        info!(
            "Built map graph with {} nodes, {} routable ways and {} edges",
            self.graph.node_count(),
            self.ways.len(),
            self.graph.edge_count()
        );
        Ok(GraphModel {
            graph: self.graph,
            node_index: self.node_index,
            ways: self.ways,
        })
    }
}
