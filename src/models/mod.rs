//! Data models for the CabFare application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and resolved places
//! - Route: Route summaries produced by the routing service
//! - Trip: Trip attributes chosen by the user for fare prediction

pub mod location;
pub mod route;
pub mod trip;

// Re-export all public types for convenient access
pub use location::{Coordinate, Place};
pub use route::{PlannedRoute, RouteSummary};
pub use trip::{ImprovementCharge, Passengers, PaymentMethod, TripDetails, Vendor};
