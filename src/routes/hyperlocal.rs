//! Hyperlocal AQI endpoint.
//!
//! `GET /api/hyperlocal-aqi?lat=..&lon=..&radius=..` refreshes the sensor
//! registry and aggregates every online sensor within the radius of the
//! query point. Missing parameters fall back to the configured defaults
//! (central Delhi, 5 km).

use axum::{
    extract::Query, extract::State, routing::get, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::{hyperlocal, HyperlocalResult};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/hyperlocal-aqi", get(handler))
}

/// Query parameters for the hyperlocal lookup.
#[derive(Debug, Deserialize)]
struct HyperlocalQuery {
    // ---
    lat: Option<f64>,
    lon: Option<f64>,
    /// Search radius in kilometres.
    radius: Option<f64>,
}

async fn handler(
    Query(params): Query<HyperlocalQuery>,
    State((registry, config)): State<AppState>,
) -> Json<HyperlocalResult> {
    // ---
    let now = Utc::now();

    let latitude = params.lat.unwrap_or(config.default_latitude);
    let longitude = params.lon.unwrap_or(config.default_longitude);
    let radius_km = params.radius.unwrap_or(config.default_radius_km);

    let sensors = registry.refresh(now);
    let result = hyperlocal::aggregate(latitude, longitude, radius_km, &sensors, now);

    info!(
        "GET /api/hyperlocal-aqi ({latitude}, {longitude}) r={radius_km}km -> aqi {} from {} sensors",
        result.aqi, result.sensor_count
    );

    Json(result)
}
