//! Map graph model: tagged nodes, routable ways and their adjacency

pub mod components;
pub mod distance;
pub mod network;

pub use components::{MapNode, MapWay, StreetEdge};
pub use distance::great_circle_distance;
pub use network::GraphModel;
