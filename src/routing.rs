//! Traffic-aware route lookup against the TomTom Calculate Route API

use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::RoutingConfig;
use crate::models::{Coordinate, RouteSummary};
use crate::{FareError, Result};

/// Fetches a single driving route between two coordinates
#[allow(async_fn_in_trait)]
pub trait RouteProvider {
    async fn fetch_route(
        &self,
        start: Coordinate,
        end: Coordinate,
        depart_at: Option<&str>,
    ) -> Result<RouteSummary>;
}

pub struct TomTomRouter {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TomTomRouter {
    pub fn new(config: &RoutingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                FareError::config("Missing routing API key (set CABFARE_ROUTING__API_KEY)")
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| FareError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn route_url(&self, start: Coordinate, end: Coordinate) -> String {
        format!(
            "{}/{}:{}/json",
            self.base_url,
            start.to_path_segment(),
            end.to_path_segment()
        )
    }
}

impl RouteProvider for TomTomRouter {
    #[instrument(skip(self))]
    async fn fetch_route(
        &self,
        start: Coordinate,
        end: Coordinate,
        depart_at: Option<&str>,
    ) -> Result<RouteSummary> {
        let mut params: Vec<(&str, &str)> = vec![
            ("key", self.api_key.as_str()),
            ("traffic", "true"),
            ("computeBestOrder", "true"),
            ("travelMode", "car"),
            ("routeType", "fastest"),
        ];
        if let Some(depart_at) = normalize_depart_at(depart_at) {
            params.push(("departAt", depart_at));
        }

        debug!("Calling the routing API");
        let start_time = Instant::now();

        let response = self
            .client
            .get(self.route_url(start, end))
            .query(&params)
            .send()
            .await
            .map_err(|e| FareError::route_unavailable(format!("routing request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FareError::route_unavailable(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            warn!("Routing service answered {}", status);
            return Err(FareError::route_unavailable(format!(
                "routing service answered {status}"
            )));
        }

        let summary = parse_route_response(&body)?;
        info!(
            "Route found: {} km, {} mins, {} points in {:.3}s",
            summary.distance_km,
            summary.duration_min,
            summary.waypoints.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(summary)
    }
}

/// Trim the user's departure time; blank means "leave now".
///
/// The value is passed through as typed. Anything that is neither `now`,
/// `YYYY-MM-DDTHH:MM:SS` nor RFC 3339 is logged and left for the routing
/// service to reject.
pub fn normalize_depart_at(raw: Option<&str>) -> Option<&str> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty())?;

    let recognised = value == "now"
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok();
    if !recognised {
        warn!("Departure time '{}' is not ISO-8601, sending as-is", value);
    }

    Some(value)
}

/// Parse a calculate-route response body, keeping only the first route.
pub fn parse_route_response(body: &str) -> Result<RouteSummary> {
    let response: tomtom::CalculateRouteResponse = serde_json::from_str(body)
        .map_err(|e| FareError::route_unavailable(format!("malformed routing response: {e}")))?;

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| FareError::route_unavailable("No routes in response"))?;

    let leg = route
        .legs
        .into_iter()
        .next()
        .ok_or_else(|| FareError::route_unavailable("Route has no legs"))?;

    let waypoints = leg
        .points
        .into_iter()
        .map(|p| Coordinate::new(p.latitude, p.longitude))
        .collect();

    RouteSummary::from_raw(
        route.summary.length_in_meters,
        route.summary.travel_time_in_seconds,
        waypoints,
    )
    .ok_or_else(|| FareError::route_unavailable("Route summary has invalid length or travel time"))
}

/// TomTom response structures, limited to the fields we read
mod tomtom {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CalculateRouteResponse {
        #[serde(default)]
        pub routes: Vec<Route>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Route {
        pub summary: Summary,
        #[serde(default)]
        pub legs: Vec<Leg>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Summary {
        pub length_in_meters: f64,
        pub travel_time_in_seconds: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Leg {
        #[serde(default)]
        pub points: Vec<Point>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Point {
        pub latitude: f64,
        pub longitude: f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THANE_TO_KHARGHAR: &str = r#"{
        "formatVersion": "0.0.12",
        "routes": [
            {
                "summary": {
                    "lengthInMeters": 15400,
                    "travelTimeInSeconds": 1850,
                    "trafficDelayInSeconds": 120
                },
                "legs": [
                    {
                        "summary": {"lengthInMeters": 15400, "travelTimeInSeconds": 1850},
                        "points": [
                            {"latitude": 19.19433, "longitude": 72.97018},
                            {"latitude": 19.10000, "longitude": 73.00000},
                            {"latitude": 19.02644, "longitude": 73.05950}
                        ]
                    }
                ]
            },
            {
                "summary": {"lengthInMeters": 9000, "travelTimeInSeconds": 900},
                "legs": [{"points": []}]
            }
        ]
    }"#;

    #[test]
    fn test_parse_first_route() {
        let summary = parse_route_response(THANE_TO_KHARGHAR).unwrap();
        assert_eq!(summary.distance_km, 15);
        assert_eq!(summary.duration_min, 30);
        assert_eq!(summary.waypoints.len(), 3);
        assert_eq!(summary.waypoints[0], Coordinate::new(19.19433, 72.97018));
    }

    #[test]
    fn test_empty_routes_is_unavailable() {
        let err = parse_route_response(r#"{"routes": []}"#).unwrap_err();
        assert!(matches!(err, FareError::RouteUnavailable { .. }));
    }

    #[test]
    fn test_error_payload_is_unavailable() {
        let body = r#"{"error": {"description": "Engine error"}, "detailedError": {"code": "NO_ROUTE_FOUND"}}"#;
        let err = parse_route_response(body).unwrap_err();
        assert!(matches!(err, FareError::RouteUnavailable { .. }));
    }

    #[test]
    fn test_malformed_response_is_unavailable() {
        for body in [
            "not json",
            r#"{"routes": [{"legs": []}]}"#,
            r#"{"routes": [{"summary": {"lengthInMeters": 100}, "legs": [{"points": []}]}]}"#,
            r#"{"routes": [{"summary": {"lengthInMeters": 100, "travelTimeInSeconds": 10}, "legs": []}]}"#,
        ] {
            assert!(
                matches!(
                    parse_route_response(body),
                    Err(FareError::RouteUnavailable { .. })
                ),
                "expected RouteUnavailable for {body}"
            );
        }
    }

    #[test]
    fn test_normalize_depart_at() {
        assert_eq!(normalize_depart_at(None), None);
        assert_eq!(normalize_depart_at(Some("   ")), None);
        assert_eq!(
            normalize_depart_at(Some(" 2025-03-01T08:30:00 ")),
            Some("2025-03-01T08:30:00")
        );
        // Unrecognised values still pass through
        assert_eq!(normalize_depart_at(Some("tomorrow")), Some("tomorrow"));
    }

    #[test]
    fn test_route_url_layout() {
        let config = RoutingConfig {
            base_url: "https://api.tomtom.com/routing/1/calculateRoute/".to_string(),
            api_key: Some("test-key".to_string()),
            timeout_seconds: 5,
        };
        let router = TomTomRouter::new(&config).unwrap();
        let url = router.route_url(Coordinate::new(19.19, 72.97), Coordinate::new(19.02, 73.06));
        assert_eq!(
            url,
            "https://api.tomtom.com/routing/1/calculateRoute/19.19,72.97:19.02,73.06/json"
        );
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = TomTomRouter::new(&RoutingConfig::default()).err().unwrap();
        assert!(matches!(err, FareError::Config { .. }));
    }
}
