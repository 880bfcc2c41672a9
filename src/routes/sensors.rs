//! IoT sensor network endpoint.
//!
//! `GET /api/iot-sensors` refreshes the mock fleet and returns every sensor
//! alongside a network health summary (status counts, average battery and
//! signal). The front end's source map and network panels read this.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use super::AppState;
use crate::{SensorNetwork, SensorSample};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/iot-sensors", get(handler))
}

/// JSON response for the sensors endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SensorsResponse {
    // ---
    sensors: Vec<SensorSample>,
    network_status: SensorNetwork,
}

async fn handler(State((registry, _config)): State<AppState>) -> impl IntoResponse {
    // ---
    let now = Utc::now();
    let sensors = registry.refresh(now);

    match registry.network_status(now) {
        Some(network_status) => {
            info!(
                "GET /api/iot-sensors - {} sensors ({} online)",
                network_status.total_sensors, network_status.online_sensors
            );
            (
                StatusCode::OK,
                Json(SensorsResponse {
                    sensors,
                    network_status,
                }),
            )
                .into_response()
        }
        None => {
            error!("Sensor registry is empty after refresh");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to fetch IoT sensor data"),
            )
                .into_response()
        }
    }
}
