//! Per-session trip state shared between "find route" and "predict fare"

use crate::models::RouteSummary;

/// Remembers the most recent successful route of one interactive session.
///
/// Each session owns its own instance. A failed route lookup never touches it.
#[derive(Debug, Clone, Default)]
pub struct TripSession {
    route: Option<RouteSummary>,
}

impl TripSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored route with a freshly fetched one
    pub fn update(&mut self, summary: RouteSummary) {
        self.route = Some(summary);
    }

    #[must_use]
    pub fn current(&self) -> Option<&RouteSummary> {
        self.route.as_ref()
    }

    #[must_use]
    pub fn route_available(&self) -> bool {
        self.route.is_some()
    }

    pub fn clear(&mut self) {
        self.route = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(distance_km: u64, duration_min: u64) -> RouteSummary {
        RouteSummary {
            distance_km,
            duration_min,
            waypoints: Vec::new(),
        }
    }

    #[test]
    fn test_empty_before_first_update() {
        let session = TripSession::new();
        assert!(session.current().is_none());
        assert!(!session.route_available());
    }

    #[test]
    fn test_update_overwrites_previous_route() {
        let mut session = TripSession::new();
        session.update(summary(15, 30));
        session.update(summary(8, 12));
        assert_eq!(session.current(), Some(&summary(8, 12)));
        assert!(session.route_available());
    }

    #[test]
    fn test_clear() {
        let mut session = TripSession::new();
        session.update(summary(15, 30));
        session.clear();
        assert!(session.current().is_none());
    }
}
