//! City-wide AQI endpoint.
//!
//! `GET /api/aqi` attempts a real fetch from the configured air pollution
//! API; when that fails (no key, network trouble, malformed payload) it
//! falls back to a synthetic city-scale reading. Either way the pollutant
//! concentrations are resolved through the AQI engine, so the reported
//! index always follows the breakpoint tables.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use chrono::{DateTime, Utc};
use rand::{thread_rng, Rng};
use serde::Serialize;
use tracing::{debug, info};

use super::AppState;
use crate::{aqi, AqiStatus, Config, Pollutant, PollutantReading};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/aqi", get(handler))
}

/// JSON response for the city-wide AQI endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CityAqiResponse {
    // ---
    aqi: u16,
    main_pollutant: Pollutant,
    status: AqiStatus,
    last_updated: DateTime<Utc>,
    location: &'static str,
    pollutants: PollutantReading,
}

async fn handler(State((_registry, config)): State<AppState>) -> impl IntoResponse {
    // ---
    let now = Utc::now();

    let reading = match fetch_city_pollutants(&config).await {
        Ok(reading) => {
            info!("Fetched live air pollution data for Delhi");
            reading
        }
        Err(e) => {
            debug!("Upstream air pollution fetch unavailable ({e}), using synthetic data");
            synthetic_city_reading(&mut thread_rng())
        }
    };

    match aqi::resolve(&reading) {
        Some(result) => (
            StatusCode::OK,
            Json(CityAqiResponse {
                aqi: result.value,
                main_pollutant: result.dominant_pollutant,
                status: result.status,
                last_updated: now,
                location: "Delhi",
                pollutants: reading,
            }),
        )
            .into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json("No pollutant data available"),
        )
            .into_response(),
    }
}

// ---

/// Fetch current pollutant concentrations from the upstream API.
///
/// Expects an OpenWeather-style payload: `list[0].components` holding
/// per-pollutant concentrations. Any missing component is simply absent
/// from the returned reading.
async fn fetch_city_pollutants(config: &Config) -> anyhow::Result<PollutantReading> {
    // ---
    let key = config
        .weather_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("OPENWEATHER_API_KEY not set"))?;

    let url = format!(
        "{}?lat={}&lon={}&appid={}",
        config.weather_api_url, config.default_latitude, config.default_longitude, key
    );

    let client = reqwest::Client::new();
    let response: serde_json::Value = client
        .get(&url)
        .header("User-Agent", "CleanAir-Delhi-NCR/1.0")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let components = response
        .get("list")
        .and_then(|l| l.get(0))
        .and_then(|entry| entry.get("components"))
        .ok_or_else(|| anyhow::anyhow!("air pollution response missing list[0].components"))?;

    let component = |key: &str| components.get(key).and_then(|v| v.as_f64());

    let reading = PollutantReading {
        pm25: component("pm2_5"),
        pm10: component("pm10"),
        no2: component("no2"),
        so2: component("so2"),
        co: component("co"),
        o3: component("o3"),
    };

    if reading.is_empty() {
        anyhow::bail!("air pollution response carried no known pollutants");
    }

    Ok(reading)
}

/// Synthesize a realistic city-scale reading for Delhi.
fn synthetic_city_reading(rng: &mut impl Rng) -> PollutantReading {
    // ---
    PollutantReading {
        pm25: Some(rng.gen_range(60.0..110.0)),
        pm10: Some(rng.gen_range(100.0..180.0)),
        no2: Some(rng.gen_range(40.0..70.0)),
        so2: Some(rng.gen_range(10.0..30.0)),
        co: Some(rng.gen_range(5.0..10.0)),
        o3: Some(rng.gen_range(30.0..70.0)),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_synthetic_reading_resolves() {
        // ---
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let reading = synthetic_city_reading(&mut rng);
            let result = aqi::resolve(&reading).unwrap();
            assert!((1..=500).contains(&result.value));
        }
    }

    #[test]
    fn test_synthetic_ranges() {
        // ---
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let r = synthetic_city_reading(&mut rng);
            assert!((60.0..110.0).contains(&r.pm25.unwrap()));
            assert!((100.0..180.0).contains(&r.pm10.unwrap()));
            assert!((40.0..70.0).contains(&r.no2.unwrap()));
            assert!((10.0..30.0).contains(&r.so2.unwrap()));
            assert!((5.0..10.0).contains(&r.co.unwrap()));
            assert!((30.0..70.0).contains(&r.o3.unwrap()));
        }
    }
}
