//! Configuration loader for the `cleanair-backend` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional float environment variable with a default value.
macro_rules! parse_env_f64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<f64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Upstream air pollution API base URL.
    pub weather_api_url: String,

    /// API key for the upstream fetch; when absent the city AQI endpoint
    /// goes straight to synthetic data.
    pub weather_api_key: Option<String>,

    /// Query-point fallback when `lat`/`lon` are not supplied (Delhi).
    pub default_latitude: f64,
    pub default_longitude: f64,

    /// Hyperlocal search radius fallback, in kilometres.
    pub default_radius_km: f64,

    /// Hours of synthetic history generated behind "now".
    pub history_hours: u32,

    /// Forecast horizon in hours (also the per-request cap).
    pub forecast_hours: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `WEATHER_API_URL` – upstream air pollution API (default: OpenWeather)
/// - `OPENWEATHER_API_KEY` – upstream API key (no default)
/// - `DEFAULT_LAT` / `DEFAULT_LON` – fallback query point (default: Delhi)
/// - `DEFAULT_RADIUS_KM` – fallback hyperlocal radius (default: 5)
/// - `HISTORY_HOURS` – synthetic history depth (default: 168)
/// - `FORECAST_HOURS` – forecast horizon (default: 72)
///
/// Returns an error if any variable is present but unparseable.
pub fn load_from_env() -> Result<Config> {
    // ---
    let weather_api_url = env::var("WEATHER_API_URL")
        .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5/air_pollution".to_string());
    let weather_api_key = env::var("OPENWEATHER_API_KEY").ok();
    let default_latitude = parse_env_f64!("DEFAULT_LAT", 28.6139);
    let default_longitude = parse_env_f64!("DEFAULT_LON", 77.209);
    let default_radius_km = parse_env_f64!("DEFAULT_RADIUS_KM", 5.0);
    let history_hours = parse_env_u32!("HISTORY_HOURS", 168);
    let forecast_hours = parse_env_u32!("FORECAST_HOURS", 72);

    Ok(Config {
        weather_api_url,
        weather_api_key,
        default_latitude,
        default_longitude,
        default_radius_km,
        history_hours,
        forecast_hours,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the upstream API key while showing all configuration values
    /// that were loaded.
    pub fn log_config(&self) {
        // ---
        let masked_key = match &self.weather_api_key {
            Some(key) if key.len() > 4 => format!("{}****", &key[..4]),
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  WEATHER_API_URL     : {}", self.weather_api_url);
        tracing::info!("  OPENWEATHER_API_KEY : {}", masked_key);
        tracing::info!(
            "  DEFAULT_LAT/LON     : {}, {}",
            self.default_latitude,
            self.default_longitude
        );
        tracing::info!("  DEFAULT_RADIUS_KM   : {}", self.default_radius_km);
        tracing::info!("  HISTORY_HOURS       : {}", self.history_hours);
        tracing::info!("  FORECAST_HOURS      : {}", self.forecast_hours);
    }
}
