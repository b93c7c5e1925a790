//! HTTP surface: request parsing, taxonomy-to-status translation and
//! response shaping. All routing work happens in `saferoute-core`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use saferoute_core::prelude::*;

/// Shared per-process state: one store client, one subgraph cache.
pub struct AppState {
    pub store: Arc<dyn GraphStore>,
    pub cache: SubgraphCache,
    pub engine: EngineConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn GraphStore>, engine: EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache: SubgraphCache::new(engine.cache_capacity),
            engine,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/find_safe_route", get(find_safe_route))
        .route("/find_safe_route.geojson", get(find_safe_route_geojson))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "success", "message": "saferoute backend"}))
}

#[derive(Debug, Deserialize)]
struct RouteQuery {
    /// `"lat,lon"`
    source: String,
    /// `"lat,lon"`
    destination: String,
    /// `HH:MM:SS`
    time: String,
    #[serde(default = "default_route_type")]
    route_type: String,
}

fn default_route_type() -> String {
    "safest".to_string()
}

#[derive(Debug, Serialize)]
struct RouteResponse {
    status: &'static str,
    /// (lat, lon) pairs of the route geometry
    route: Vec<(f64, f64)>,
    info: RouteMetrics,
}

async fn find_safe_route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let route = run_query(state, query).await?;
    Ok(Json(RouteResponse {
        status: "success",
        route: route.coordinates,
        info: route.metrics,
    }))
}

async fn find_safe_route_geojson(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<geojson::Feature>, ApiError> {
    let route = run_query(state, query).await?;
    Ok(Json(route.to_geojson()))
}

/// Parses the query into a core request and runs the engine on the
/// blocking pool; the store client is synchronous and must not stall
/// the async workers.
async fn run_query(state: Arc<AppState>, query: RouteQuery) -> Result<Route, ApiError> {
    let request = RouteRequest {
        source: parse_point("source", &query.source)?,
        dest: parse_point("destination", &query.destination)?,
        time: query.time,
        mode: query.route_type,
    };

    let route = tokio::task::spawn_blocking(move || {
        compute_route(state.store.as_ref(), &state.cache, &state.engine, &request)
    })
    .await
    .map_err(|e| Error::Internal(format!("routing task failed: {e}")))??;
    Ok(route)
}

fn parse_point(field: &str, raw: &str) -> Result<(f64, f64), Error> {
    let invalid = || Error::InvalidInput(format!("{field} must be 'lat,lon', got '{raw}'"));
    let (lat, lon) = raw.split_once(',').ok_or_else(invalid)?;
    Ok((
        lat.trim().parse().map_err(|_| invalid())?,
        lon.trim().parse().map_err(|_| invalid())?,
    ))
}

/// Engine error carried to the transport layer.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) | Error::InvalidRouteType(_) => StatusCode::BAD_REQUEST,
            Error::NoDataInRegion | Error::NoRouteFound => StatusCode::NOT_FOUND,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({"status": "error", "error": self.0.to_string()}));
        (status, body).into_response()
    }
}
