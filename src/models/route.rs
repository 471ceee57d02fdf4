//! Route summaries derived from routing responses

use super::{Coordinate, Place};
use serde::{Deserialize, Serialize};

/// Distance, duration and polyline of one fetched route
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteSummary {
    /// Whole kilometres, floored
    pub distance_km: u64,
    /// Whole minutes, floored
    pub duration_min: u64,
    pub waypoints: Vec<Coordinate>,
}

impl RouteSummary {
    /// Build a summary from the raw metres/seconds reported by the routing service.
    ///
    /// Both values are floored, never rounded up. Returns `None` for negative
    /// or non-finite input.
    #[must_use]
    pub fn from_raw(
        length_in_meters: f64,
        travel_time_in_seconds: f64,
        waypoints: Vec<Coordinate>,
    ) -> Option<Self> {
        Some(Self {
            distance_km: floor_ratio(length_in_meters, 1000.0)?,
            duration_min: floor_ratio(travel_time_in_seconds, 60.0)?,
            waypoints,
        })
    }
}

fn floor_ratio(value: f64, divisor: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    // Truncation of a non-negative value is a floor.
    Some((value / divisor).floor() as u64)
}

/// Outcome of one "find route" action
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlannedRoute {
    pub start: Place,
    pub end: Place,
    pub summary: RouteSummary,
}
