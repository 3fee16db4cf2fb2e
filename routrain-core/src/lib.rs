//! Pedestrian routing over a tagged map graph where edge costs come from a
//! hierarchical penalty rule set, together with a learner that calibrates
//! that rule set from example routes.

use std::collections::BTreeMap;

pub mod attribution;
pub mod config;
mod error;
pub mod learning;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod rules;

pub use error::Error;

/// OSM identifier of a map node
pub type NodeId = i64;
/// OSM identifier of a way
pub type WayId = i64;
/// Tag mapping of a node or way, ordered by key
pub type Tags = BTreeMap<String, String>;
