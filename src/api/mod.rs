mod sessions;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::config::CabFareConfig;
use crate::fare::{ChargeSource, FareEstimator, FareFeatures, RandomCharge};
use crate::geocoding::NominatimGeocoder;
use crate::map::RouteMap;
use crate::models::{ImprovementCharge, Passengers, PaymentMethod, RouteSummary, TripDetails, Vendor};
use crate::planner::TripPlanner;
use crate::routing::TomTomRouter;
use crate::session::TripSession;
use crate::{ErrorCode, FareError};

pub use sessions::SessionRegistry;

pub type SharedState = Arc<AppState>;

/// Collaborators shared by every request plus one [`TripSession`] per client
pub struct AppState {
    planner: TripPlanner<NominatimGeocoder, TomTomRouter>,
    estimator: FareEstimator,
    sessions: Mutex<SessionRegistry>,
}

impl AppState {
    pub fn new(
        planner: TripPlanner<NominatimGeocoder, TomTomRouter>,
        estimator: FareEstimator,
        sessions: SessionRegistry,
    ) -> Self {
        Self {
            planner,
            estimator,
            sessions: Mutex::new(sessions),
        }
    }

    pub fn from_config(config: &CabFareConfig) -> crate::Result<Self> {
        let planner = TripPlanner::new(
            NominatimGeocoder::new(&config.geocoding)?,
            TomTomRouter::new(&config.routing)?,
        );
        let sessions = SessionRegistry::new(
            Duration::from_secs(config.server.session_ttl_seconds),
            config.server.max_sessions,
        );
        Ok(Self::new(
            planner,
            FareEstimator::from_config(&config.model),
            sessions,
        ))
    }

    fn sessions(&self) -> MutexGuard<'_, SessionRegistry> {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn open_session(&self) -> String {
        self.sessions().open(Instant::now())
    }

    fn snapshot(&self, id: &str) -> Result<TripSession, ApiError> {
        self.sessions()
            .get_mut(id, Instant::now())
            .cloned()
            .ok_or_else(|| ApiError::UnknownSession(id.to_string()))
    }

    fn record_route(&self, id: &str, summary: RouteSummary) -> Result<(), ApiError> {
        let mut sessions = self.sessions();
        let session = sessions
            .get_mut(id, Instant::now())
            .ok_or_else(|| ApiError::UnknownSession(id.to_string()))?;
        session.update(summary);
        Ok(())
    }

    fn close_session(&self, id: &str) -> Result<(), ApiError> {
        if self.sessions().remove(id) {
            Ok(())
        } else {
            Err(ApiError::UnknownSession(id.to_string()))
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    UnknownSession(String),
    NoRouteYet,
    Fare(FareError),
}

impl From<FareError> for ApiError {
    fn from(error: FareError) -> Self {
        Self::Fare(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Fare(FareError::validation(rejection.body_text()))
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::LocationNotFound => StatusCode::NOT_FOUND,
        ErrorCode::RouteUnavailable => StatusCode::BAD_GATEWAY,
        ErrorCode::NoRoute => StatusCode::CONFLICT,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::ModelLoad | ErrorCode::Prediction | ErrorCode::Config | ErrorCode::Io => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code) = match &self {
            ApiError::UnknownSession(id) => (
                StatusCode::NOT_FOUND,
                format!("Unknown session '{id}'"),
                "session_not_found",
            ),
            ApiError::NoRouteYet => (
                StatusCode::NOT_FOUND,
                "No route has been found in this session yet".to_string(),
                ErrorCode::NoRoute.as_str(),
            ),
            ApiError::Fare(error) => {
                warn!("Request failed: {}", error);
                (status_for(error.code()), error.user_message(), error.code().as_str())
            }
        };
        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

#[derive(Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub depart_at: Option<String>,
}

#[derive(Serialize)]
pub struct RouteResponse {
    pub distance_km: u64,
    pub duration_min: u64,
    pub map: RouteMap,
}

#[derive(Serialize, Deserialize)]
pub struct FareRequest {
    pub vendor_id: Vendor,
    pub num_passengers: Passengers,
    pub payment_method: PaymentMethod,
    /// Drawn at random when absent
    #[serde(default)]
    pub improvement_charge: Option<ImprovementCharge>,
}

#[derive(Serialize)]
pub struct FareResponse {
    pub features: FareFeatures,
    pub fare: f64,
    pub display: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/route", post(find_route).get(current_route))
        .route("/sessions/{id}/fare", post(estimate_fare))
        .with_state(state)
}

async fn create_session(State(state): State<SharedState>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.open_session();
    info!("Opened session {}", session_id);
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.close_session(&id)?;
    info!("Closed session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn find_route(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiError> {
    let Json(request) = payload?;
    state.snapshot(&id)?;

    let planned = state
        .planner
        .plan_route(&request.start, &request.end, request.depart_at.as_deref())
        .await?;
    state.record_route(&id, planned.summary.clone())?;

    Ok(Json(RouteResponse {
        distance_km: planned.summary.distance_km,
        duration_min: planned.summary.duration_min,
        map: RouteMap::new(&planned),
    }))
}

async fn current_route(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<RouteSummary>, ApiError> {
    let session = state.snapshot(&id)?;
    session
        .current()
        .cloned()
        .map(Json)
        .ok_or(ApiError::NoRouteYet)
}

async fn estimate_fare(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<FareRequest>, JsonRejection>,
) -> Result<Json<FareResponse>, ApiError> {
    let Json(request) = payload?;
    let session = state.snapshot(&id)?;

    let details = TripDetails {
        vendor: request.vendor_id,
        passengers: request.num_passengers,
        payment: request.payment_method,
    };
    let charge = request
        .improvement_charge
        .unwrap_or_else(|| RandomCharge.draw());

    // Model loading reads the artifact from disk
    let worker = Arc::clone(&state);
    let estimate = tokio::task::spawn_blocking(move || {
        worker.estimator.estimate(&session, &details, charge)
    })
    .await
    .map_err(|e| FareError::prediction(format!("fare task failed: {e}")))??;
    Ok(Json(FareResponse {
        display: estimate.to_string(),
        fare: estimate.fare,
        features: estimate.features,
    }))
}
