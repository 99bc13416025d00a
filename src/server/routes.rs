//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::coord::GeoPoint;
use crate::error::Error;
use crate::index::Neighbor;
use crate::report::{NewReport, Report};
use crate::server::state::AppState;
use crate::service::{NearbyOrder, ZoneAssessment};
use crate::store::ReportRepository;
use crate::zone::Zone;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/reports", get(nearby_handler).post(ingest_handler))
        .route("/api/disaster-types", get(types_handler))
        .route("/api/red-zones", get(red_zones_handler))
        .route("/api/zone", get(zone_handler))
        .route("/api/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// API error with its HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                code: "VALIDATION_ERROR".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = if err.is_validation() {
            StatusCode::BAD_REQUEST
        } else if err.is_repository() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        ApiError {
            status,
            body: ErrorBody {
                error: err.to_string(),
                code: err.code().to_string(),
            },
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// A list of reports with their distances
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportsResponse {
    pub count: usize,
    pub reports: Vec<Neighbor>,
}

impl From<Vec<Neighbor>> for ReportsResponse {
    fn from(reports: Vec<Neighbor>) -> Self {
        Self {
            count: reports.len(),
            reports,
        }
    }
}

/// Nearby query parameters
#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
    /// Search radius in meters
    pub radius: Option<f64>,
    pub limit: Option<usize>,
    /// "recent" (default) or "distance"
    pub order: Option<String>,
}

/// Reports near a point
///
/// GET /api/reports?lat=..&lon=..
async fn nearby_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<ReportsResponse>, ApiError> {
    let Query(params) = params?;
    let location = GeoPoint::new(params.lat, params.lon)?;
    let order = match params.order.as_deref() {
        Some(order) => NearbyOrder::from_str(order).map_err(ApiError::bad_request)?,
        None => NearbyOrder::Recent,
    };

    let query = &state.config.query;
    let hits = state.service.query_nearby_ordered(
        location,
        params.radius.unwrap_or(query.nearby_radius_meters),
        params.limit.unwrap_or(query.nearby_limit),
        order,
    )?;

    Ok(Json(hits.into()))
}

/// Submit a report
///
/// POST /api/reports
async fn ingest_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewReport>, JsonRejection>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let Json(input) = payload?;
    let report = state.service.ingest(input).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Types list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TypesResponse {
    pub types: Vec<String>,
}

/// List disaster types
///
/// GET /api/disaster-types
async fn types_handler(State(state): State<Arc<AppState>>) -> Json<TypesResponse> {
    Json(TypesResponse {
        types: state
            .service
            .list_disaster_types()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

/// Red-zone query parameters
#[derive(Debug, Deserialize)]
pub struct RedZoneParams {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
    pub limit: Option<usize>,
    /// Least severe zone to include
    pub min_zone: Option<String>,
}

/// Nearest high-risk reports
///
/// GET /api/red-zones?lat=..&lon=..
async fn red_zones_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<RedZoneParams>, QueryRejection>,
) -> Result<Json<ReportsResponse>, ApiError> {
    let Query(params) = params?;
    let location = GeoPoint::new(params.lat, params.lon)?;
    let min_zone = match params.min_zone.as_deref() {
        Some(zone) => Zone::from_str(zone).map_err(ApiError::bad_request)?,
        None => state.config.red_zone_min_zone()?,
    };
    let limit = params.limit.unwrap_or(state.config.query.red_zone_limit);

    Ok(Json(state.service.query_red_zones(location, limit, min_zone).into()))
}

/// Point parameters
#[derive(Debug, Deserialize)]
pub struct PointParams {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
}

/// Density and zone at a point
///
/// GET /api/zone?lat=..&lon=..
async fn zone_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PointParams>, QueryRejection>,
) -> Result<Json<ZoneAssessment>, ApiError> {
    let Query(params) = params?;
    let location = GeoPoint::new(params.lat, params.lon)?;
    Ok(Json(state.service.assess(location)))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Reports in the index
    pub reports: usize,
    /// Spatial index in use
    pub index: String,
    /// Storage backend in use
    pub storage: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        reports: state.service.index().len(),
        index: state.service.index().name().to_string(),
        storage: state.service.repository().name().to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::index::rtree::RTreeIndex;
    use crate::service::{AggregationService, ServiceSettings};
    use crate::store::file::JsonFileRepository;
    use crate::store::memory::MemoryRepository;
    use crate::store::Store;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn state_with_store(store: Store) -> Arc<AppState> {
        let service = AggregationService::new(
            Arc::new(RTreeIndex::new()),
            store,
            ServiceSettings::default(),
        );
        Arc::new(AppState::with_service(Config::default(), service))
    }

    fn create_test_state() -> Arc<AppState> {
        state_with_store(Store::Memory(MemoryRepository::new()))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_report(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/reports")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn flood(lat: f64, lon: f64) -> serde_json::Value {
        serde_json::json!({
            "lat": lat,
            "lon": lon,
            "disaster_type": "Flood",
            "description": "road flooded",
            "image_url": "/uploads/road.jpg",
        })
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();

        assert!(status.running);
        assert_eq!(status.reports, 0);
        assert_eq!(status.index, "rtree");
        assert_eq!(status.storage, "memory");
    }

    #[tokio::test]
    async fn test_types_endpoint() {
        let app = create_router(create_test_state());
        let (status, body) = get_json(app, "/api/disaster-types").await;

        assert_eq!(status, StatusCode::OK);
        let types: TypesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(types.types.len(), 6);
        assert!(types.types.contains(&"Earthquake".to_string()));
    }

    #[tokio::test]
    async fn test_ingest_then_query() {
        let state = create_test_state();

        let (status, created) = post_report(create_router(state.clone()), flood(14.5995, 120.9842)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["zone"], "green");
        assert_eq!(created["image_ref"], "/uploads/road.jpg");
        assert!(!created["id"].as_str().unwrap().is_empty());

        let (status, body) = get_json(
            create_router(state),
            "/api/reports?lat=14.5995&lng=120.9842&radius=500",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["reports"][0]["id"], created["id"]);
        assert_eq!(body["reports"][0]["distance_meters"], 0.0);
    }

    #[tokio::test]
    async fn test_nearby_defaults_to_recent_order() {
        let state = create_test_state();
        // Nearer report first, farther report last
        post_report(create_router(state.clone()), flood(0.0, 0.0)).await;
        post_report(create_router(state.clone()), flood(0.0, 0.005)).await;

        let (_, recent) = get_json(create_router(state.clone()), "/api/reports?lat=0&lon=0").await;
        assert!(recent["reports"][0]["distance_meters"].as_f64().unwrap() > 500.0);

        let (_, nearest) = get_json(create_router(state), "/api/reports?lat=0&lon=0&order=distance").await;
        assert_eq!(nearest["reports"][0]["distance_meters"], 0.0);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_are_400() {
        let app = create_router(create_test_state());
        let (status, body) = get_json(app, "/api/reports?lat=91&lon=0").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_missing_parameters_are_400() {
        let app = create_router(create_test_state());
        let (status, body) = get_json(app, "/api/zone?lat=10").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_type_is_400() {
        let app = create_router(create_test_state());
        let mut report = flood(0.0, 0.0);
        report["disaster_type"] = "Meteor".into();

        let (status, body) = post_report(app, report).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNKNOWN_DISASTER_TYPE");
    }

    #[tokio::test]
    async fn test_bad_order_is_400() {
        let app = create_router(create_test_state());
        let (status, _) = get_json(app, "/api/reports?lat=0&lon=0&order=sideways").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_red_zones_endpoint() {
        let state = create_test_state();
        for _ in 0..11 {
            post_report(create_router(state.clone()), flood(-6.2088, 106.8456)).await;
        }

        let (status, body) = get_json(create_router(state.clone()), "/api/red-zones?lat=-6.2&lon=106.8").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);

        let (_, body) = get_json(
            create_router(state.clone()),
            "/api/red-zones?lat=-6.2&lon=106.8&min_zone=yellow",
        )
        .await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["reports"][0]["zone"], "yellow");

        let (status, _) = get_json(create_router(state), "/api/red-zones?lat=0&lon=0&min_zone=purple").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_zone_endpoint() {
        let state = create_test_state();
        post_report(create_router(state.clone()), flood(48.8566, 2.3522)).await;

        let (status, body) = get_json(create_router(state), "/api/zone?lat=48.8566&lon=2.3522").await;
        assert_eq!(status, StatusCode::OK);
        let assessment: ZoneAssessment = serde_json::from_value(body).unwrap();
        assert_eq!(assessment.count, 1);
        assert_eq!(assessment.zone, Zone::Green);
        assert_eq!(assessment.radius_meters, 2000.0);
    }

    #[tokio::test]
    async fn test_repository_failure_is_503() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("reports.json");
        let repo = JsonFileRepository::open(path.clone()).unwrap();
        // A directory in place of the file makes every write fail
        std::fs::create_dir_all(&path).unwrap();

        let state = state_with_store(Store::File(repo));
        let (status, body) = post_report(create_router(state.clone()), flood(0.0, 0.0)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "REPOSITORY_ERROR");
        assert!(state.service.index().is_empty());
    }
}
