//! Loopback stand-ins for the geocoding and routing services

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use cabfare::CabFareConfig;
use serde_json::{Value, json};

pub const API_KEY: &str = "test-key";

/// Geocodes to a point the fake router has no route for
pub const UNROUTABLE: &str = "Open Sea";

pub const LINEAR_MODEL: &str = r#"{
    "version": 1,
    "features": ["vendor_id", "mta_tax", "distance", "num_passengers", "toll_amount",
                 "payment_method", "improvement_charge", "extra_charges", "trip_duration", "day_type"],
    "regressor": {
        "kind": "linear",
        "intercept": 2.5,
        "coefficients": [0.3, 1.0, 1.25, 0.1, 1.0, -0.2, 1.0, 1.0, 0.3, 0.0]
    }
}"#;

type Calls = Arc<Mutex<Vec<HashMap<String, String>>>>;

pub struct FakeUpstream {
    pub base_url: String,
    routing_calls: Calls,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let routing_calls: Calls = Arc::default();
        let app = Router::new()
            .route("/search", get(search))
            .route("/routing/{locations}/json", get(calculate_route))
            .with_state(routing_calls.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            routing_calls,
        }
    }

    /// Configuration pointing both clients at this server
    pub fn config(&self, model_path: &Path) -> CabFareConfig {
        let mut config = CabFareConfig::default();
        config.geocoding.base_url = self.base_url.clone();
        config.routing.base_url = format!("{}/routing", self.base_url);
        config.routing.api_key = Some(API_KEY.to_string());
        config.model.path = model_path.to_path_buf();
        config
    }

    /// Query strings the routing endpoint has received so far
    pub fn routing_calls(&self) -> Vec<HashMap<String, String>> {
        self.routing_calls.lock().unwrap().clone()
    }
}

pub fn write_model(dir: &Path) -> PathBuf {
    let path = dir.join("model.json");
    fs::write(&path, LINEAR_MODEL).unwrap();
    path
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let hit = match params.get("q").map(String::as_str) {
        Some("Thane") => Some(("19.1943", "72.9702", "Thane, Maharashtra, India")),
        Some("Kharghar Railway Station") => Some((
            "19.0264",
            "73.0595",
            "Kharghar Railway Station, Navi Mumbai, Maharashtra, India",
        )),
        Some(UNROUTABLE) => Some(("10.5", "-20.5", "North Atlantic Ocean")),
        _ => None,
    };

    Json(match hit {
        Some((lat, lon, name)) => json!([{ "lat": lat, "lon": lon, "display_name": name }]),
        None => json!([]),
    })
}

async fn calculate_route(
    State(calls): State<Calls>,
    UrlPath(locations): UrlPath<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    calls.lock().unwrap().push(params.clone());

    if params.get("key").map(String::as_str) != Some(API_KEY) {
        return (StatusCode::FORBIDDEN, "Developer Inactive").into_response();
    }
    if locations.contains("10.5,-20.5") {
        return Json(json!({ "routes": [] })).into_response();
    }

    Json(json!({
        "formatVersion": "0.0.12",
        "routes": [
            {
                "summary": { "lengthInMeters": 15400, "travelTimeInSeconds": 1850 },
                "legs": [{
                    "points": [
                        { "latitude": 19.1943, "longitude": 72.9702 },
                        { "latitude": 19.1102, "longitude": 73.0121 },
                        { "latitude": 19.0264, "longitude": 73.0595 }
                    ]
                }]
            },
            {
                "summary": { "lengthInMeters": 19900, "travelTimeInSeconds": 2400 },
                "legs": [{ "points": [] }]
            }
        ]
    }))
    .into_response()
}
