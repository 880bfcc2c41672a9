//! Hyperlocal AQI: aggregate the sensors within a radius of a query point.
//!
//! Sensors are filtered by great-circle distance and operational status,
//! their concentrations averaged per pollutant, and the average resolved
//! through the AQI engine. Confidence grows with the number of corroborating
//! sensors up to a 95% ceiling.

use chrono::{DateTime, Utc};

use crate::aqi;
use crate::models::{HyperlocalResult, Pollutant, PollutantReading, SensorSample, SensorStatus};

// ---

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two lat/lon points, in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // ---
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

// ---

/// Aggregate all online sensors within `radius_km` of the query point.
///
/// Returns an explicit no-data result (zero AQI, zero confidence,
/// `no_data: true`) when nothing is in range; callers must check it before
/// trusting the value.
pub fn aggregate(
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    sensors: &[SensorSample],
    now: DateTime<Utc>,
) -> HyperlocalResult {
    // ---
    let nearby: Vec<&SensorSample> = sensors
        .iter()
        .filter(|s| s.status == SensorStatus::Online)
        .filter(|s| haversine_km(latitude, longitude, s.latitude, s.longitude) <= radius_km)
        .collect();

    if nearby.is_empty() {
        return no_data_result(now);
    }

    // Average each pollutant over the sensors that report it.
    let mut averaged = PollutantReading::default();
    for pollutant in Pollutant::PRIORITY {
        let values: Vec<f64> = nearby.iter().filter_map(|s| s.readings.get(pollutant)).collect();
        if !values.is_empty() {
            averaged.set(pollutant, values.iter().sum::<f64>() / values.len() as f64);
        }
    }

    // Resolver comes back empty only if every sensor in range reported no
    // pollutants at all; treat that the same as an empty radius.
    let Some(result) = aqi::resolve(&averaged) else {
        return no_data_result(now);
    };

    let confidence = confidence_for(nearby.len());

    HyperlocalResult {
        location: location_name(latitude, longitude).to_string(),
        aqi: result.value,
        primary_pollutant: Some(result.dominant_pollutant),
        confidence,
        sensor_count: nearby.len(),
        last_updated: now,
        recommendations: recommendations(result.value, result.dominant_pollutant),
        no_data: false,
    }
}

/// Saturating confidence: 70% for a single sensor, +10 per extra, 95% cap.
fn confidence_for(sensor_count: usize) -> u8 {
    (60 + 10 * sensor_count as u64).min(95) as u8
}

fn no_data_result(now: DateTime<Utc>) -> HyperlocalResult {
    // ---
    HyperlocalResult {
        location: "No sensors nearby".to_string(),
        aqi: 0,
        primary_pollutant: None,
        confidence: 0,
        sensor_count: 0,
        last_updated: now,
        recommendations: vec!["No sensor data available for this location".to_string()],
        no_data: true,
    }
}

/// Coarse display name for a query point, from fixed coordinate boxes.
fn location_name(lat: f64, lon: f64) -> &'static str {
    // ---
    if lat > 28.6 && lat < 28.7 && lon > 77.2 && lon < 77.3 {
        "Central Delhi"
    } else if lat > 28.4 && lat < 28.5 && lon > 77.0 && lon < 77.1 {
        "Gurgaon"
    } else if lat > 28.5 && lat < 28.6 && lon > 77.3 && lon < 77.4 {
        "Noida"
    } else {
        "Delhi-NCR"
    }
}

/// Health advice strings keyed by AQI band plus one line for the dominant
/// pollutant. Deterministic: same input, same list.
fn recommendations(aqi: u16, pollutant: Pollutant) -> Vec<String> {
    // ---
    let mut recs: Vec<String> = Vec::new();

    if aqi <= 50 {
        recs.push("Excellent air quality - perfect for outdoor activities".into());
    } else if aqi <= 100 {
        recs.push("Good air quality - suitable for most outdoor activities".into());
    } else if aqi <= 150 {
        recs.push(
            "Moderate air quality - sensitive individuals should limit outdoor activities".into(),
        );
        recs.push("Consider wearing a mask if you have respiratory conditions".into());
    } else if aqi <= 200 {
        recs.push("Unhealthy air quality - limit outdoor activities".into());
        recs.push("Wear N95 masks when going outside".into());
        recs.push("Keep windows closed and use air purifiers".into());
    } else {
        recs.push("Very unhealthy air quality - avoid outdoor activities".into());
        recs.push("Stay indoors with air purifiers running".into());
        recs.push("Wear N95 masks if you must go outside".into());
    }

    let pollutant_note = match pollutant {
        Pollutant::Pm25 => {
            "PM2.5 is the primary concern - these particles can penetrate deep into lungs"
        }
        Pollutant::Pm10 => "PM10 particles are larger but can still cause respiratory issues",
        Pollutant::No2 => "High NO2 levels - avoid areas with heavy traffic",
        Pollutant::So2 => "Elevated SO2 - keep distance from industrial zones",
        Pollutant::Co => "High CO levels - avoid enclosed spaces near heavy traffic",
        Pollutant::O3 => "Ozone is elevated - avoid strenuous outdoor activity in the afternoon",
    };
    recs.push(pollutant_note.into());

    recs
}
