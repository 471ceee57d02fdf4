//! `CabFare` - route lookup and cab fare prediction
//!
//! Resolves place names to coordinates, asks a routing service for the
//! driving distance and time between them, and scores a pre-trained fare
//! model on the resulting trip.

pub mod api;
pub mod config;
pub mod error;
pub mod fare;
pub mod geocoding;
pub mod map;
pub mod models;
pub mod planner;
pub mod routing;
pub mod session;
pub mod shell;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::CabFareConfig;
pub use error::{ErrorCode, FareError};
pub use fare::{FareEstimate, FareEstimator, ModelStore};
pub use geocoding::{Geocoder, NominatimGeocoder};
pub use models::{Coordinate, ImprovementCharge, Place, PlannedRoute, RouteSummary, TripDetails};
pub use planner::TripPlanner;
pub use routing::{RouteProvider, TomTomRouter};
pub use session::TripSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, FareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
