use geo::{Coord, LineString};
use geojson::{Feature, Geometry};
use serde_json::json;

use super::Route;
use crate::{Error, model::GraphModel};

impl Route {
    /// Converts the route to a `GeoJSON` `LineString` feature carrying the
    /// cost, length and node ids as properties.
    pub fn to_geojson(&self, graph: &GraphModel) -> Result<Feature, Error> {
        let coords = self
            .steps
            .iter()
            .map(|step| {
                graph
                    .coordinates(step.node)
                    .map(Coord::from)
                    .ok_or(Error::UnknownNode(step.node))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let line = LineString::new(coords);

        let value = json!({
            "type": "Feature",
            "geometry": Geometry::new((&line).into()),
            "properties": {
                "cost": self.cost,
                "length": self.length(),
                "nodes": self.node_ids(),
            }
        });

        serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }

    pub fn to_geojson_string(&self, graph: &GraphModel) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson(graph)?)
            .map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}
