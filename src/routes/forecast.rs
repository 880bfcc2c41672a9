//! Forecast endpoint.
//!
//! `GET /api/forecast?hours=..` synthesizes the trailing week of hourly
//! history, extrapolates it forward (72 hours by default, capped at the
//! configured horizon), and labels the trend of both series.

use axum::{
    extract::Query, extract::State, routing::get, Json, Router,
};
use chrono::Utc;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::forecast;
use crate::{ForecastPoint, HistoricalPoint, Trend};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/forecast", get(handler))
}

#[derive(Debug, Deserialize)]
struct ForecastQuery {
    // ---
    /// Forecast horizon in hours; capped at the configured maximum.
    hours: Option<u32>,
}

/// Trend labels for the two series in a forecast response.
#[derive(Debug, Serialize)]
struct TrendSummary {
    // ---
    historical: Trend,
    forecast: Trend,
}

/// JSON response for the forecast endpoint.
#[derive(Debug, Serialize)]
struct ForecastResponse {
    // ---
    historical: Vec<HistoricalPoint>,
    forecast: Vec<ForecastPoint>,
    trend: TrendSummary,
}

async fn handler(
    Query(params): Query<ForecastQuery>,
    State((_registry, config)): State<AppState>,
) -> Json<ForecastResponse> {
    // ---
    let now = Utc::now();
    let mut rng = thread_rng();

    let hours_forward = params
        .hours
        .unwrap_or(config.forecast_hours)
        .min(config.forecast_hours);

    let historical = forecast::generate_historical(config.history_hours, now, &mut rng);
    let points = forecast::generate_forecast(&historical, hours_forward, now, &mut rng);

    let historical_aqi: Vec<u16> = historical.iter().map(|p| p.aqi).collect();
    let forecast_aqi: Vec<u16> = points.iter().map(|p| p.aqi).collect();
    let trend = TrendSummary {
        historical: forecast::classify(&historical_aqi),
        forecast: forecast::classify(&forecast_aqi),
    };

    info!(
        "GET /api/forecast - {} historical points, {} forecast points",
        historical.len(),
        points.len()
    );

    Json(ForecastResponse {
        historical,
        forecast: points,
        trend,
    })
}
