use serde::{Deserialize, Serialize};

use super::builder::GraphBuilder;
use crate::{Error, NodeId, Tags, WayId, model::GraphModel};

/// Node as stored in a map document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Tags,
}

/// Way as stored in a map document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWay {
    pub id: WayId,
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub tags: Tags,
}

/// Map extract in JSON form: `{"nodes": [...], "ways": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapDocument {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub ways: Vec<RawWay>,
}

impl MapDocument {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_graph(self) -> Result<GraphModel, Error> {
        let mut builder = GraphBuilder::with_capacity(self.nodes.len(), self.ways.len());
        for node in self.nodes {
            builder.add_node(node.id, node.lat, node.lon, node.tags)?;
        }
        for way in self.ways {
            builder.add_way(way.id, way.nodes, way.tags)?;
        }
        builder.build()
    }
}
