//! Trip planning workflow
//!
//! Sequences the place lookups and the route request of a "find route"
//! action and records the result in the caller's [`TripSession`].

use tracing::{info, instrument};

use crate::geocoding::Geocoder;
use crate::models::PlannedRoute;
use crate::routing::RouteProvider;
use crate::session::TripSession;
use crate::Result;

pub struct TripPlanner<G, R> {
    geocoder: G,
    router: R,
}

impl<G: Geocoder, R: RouteProvider> TripPlanner<G, R> {
    pub fn new(geocoder: G, router: R) -> Self {
        Self { geocoder, router }
    }

    /// Resolve both places and fetch the route between them.
    ///
    /// The first failing step ends the request; nothing is retried.
    #[instrument(skip(self))]
    pub async fn plan_route(
        &self,
        start: &str,
        end: &str,
        depart_at: Option<&str>,
    ) -> Result<PlannedRoute> {
        let start = self.geocoder.resolve(start).await?;
        let end = self.geocoder.resolve(end).await?;

        let summary = self
            .router
            .fetch_route(start.coordinate, end.coordinate, depart_at)
            .await?;

        info!(
            "Planned {} -> {}: {} km, {} mins",
            start.query, end.query, summary.distance_km, summary.duration_min
        );
        Ok(PlannedRoute {
            start,
            end,
            summary,
        })
    }

    /// [`plan_route`](Self::plan_route), then store the summary in `session` on success
    pub async fn find_route(
        &self,
        session: &mut TripSession,
        start: &str,
        end: &str,
        depart_at: Option<&str>,
    ) -> Result<PlannedRoute> {
        let planned = self.plan_route(start, end, depart_at).await?;
        session.update(planned.summary.clone());
        Ok(planned)
    }
}
