//! Location model for geographic coordinates and resolved places

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Position in `[longitude, latitude]` order, as GeoJSON expects
    #[must_use]
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Format used in routing request paths, e.g. `19.2183,72.9781`
    #[must_use]
    pub fn to_path_segment(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A place name resolved by the geocoder
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Place {
    /// The name the user typed
    pub query: String,
    /// Full name reported by the geocoder, if any
    pub display_name: Option<String>,
    pub coordinate: Coordinate,
}

impl Place {
    #[must_use]
    pub fn new(query: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            query: query.into(),
            display_name: None,
            coordinate,
        }
    }

    /// Name to show in popups and status lines
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_display() {
        let thane = Coordinate::new(19.218_331, 72.978_088);
        assert_eq!(thane.to_string(), "19.2183, 72.9781");
    }

    #[test]
    fn test_path_segment_keeps_full_precision() {
        let point = Coordinate::new(19.218_331, -72.5);
        assert_eq!(point.to_path_segment(), "19.218331,-72.5");
        assert_eq!(point.lon_lat(), [-72.5, 19.218_331]);
    }

    #[test]
    fn test_place_label_prefers_display_name() {
        let mut place = Place::new("Thane", Coordinate::new(19.2, 72.9));
        assert_eq!(place.label(), "Thane");
        place.display_name = Some("Thane, Maharashtra, India".to_string());
        assert_eq!(place.label(), "Thane, Maharashtra, India");
    }
}
