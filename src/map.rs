//! Map payload for a planned route
//!
//! Renders nothing itself: it produces the GeoJSON a map widget needs to draw
//! the start and destination markers and the route polyline.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{Value, json};

use crate::Result;
use crate::models::{Coordinate, PlannedRoute};

pub const DEFAULT_ZOOM: u8 = 10;
const START_COLOR: &str = "green";
const DESTINATION_COLOR: &str = "red";
const ROUTE_COLOR: &str = "blue";
const ROUTE_WEIGHT: u8 = 5;

/// GeoJSON `FeatureCollection` with `center` and `zoom` foreign members
#[derive(Debug, Clone, Serialize)]
pub struct RouteMap {
    #[serde(rename = "type")]
    kind: &'static str,
    /// `[latitude, longitude]` the view opens on
    pub center: [f64; 2],
    pub zoom: u8,
    pub features: Vec<Value>,
}

impl RouteMap {
    #[must_use]
    pub fn new(route: &PlannedRoute) -> Self {
        let start = route.start.coordinate;
        let end = route.end.coordinate;

        let line: Vec<[f64; 2]> = route
            .summary
            .waypoints
            .iter()
            .map(Coordinate::lon_lat)
            .collect();

        Self {
            kind: "FeatureCollection",
            center: [start.latitude, start.longitude],
            zoom: DEFAULT_ZOOM,
            features: vec![
                marker(start, "Start", route.start.label(), START_COLOR),
                marker(end, "Destination", route.end.label(), DESTINATION_COLOR),
                json!({
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": line },
                    "properties": {
                        "stroke": ROUTE_COLOR,
                        "stroke-width": ROUTE_WEIGHT,
                        "distance_km": route.summary.distance_km,
                        "duration_min": route.summary.duration_min,
                    }
                }),
            ],
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn marker(at: Coordinate, popup: &str, name: &str, color: &str) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": at.lon_lat() },
        "properties": {
            "popup": popup,
            "name": name,
            "marker-color": color,
        }
    })
}
