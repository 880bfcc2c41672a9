//! Core data models for the CleanAir air quality pipeline.
//!
//! Wire names follow the dashboard's existing JSON contract (camelCase keys,
//! display-style pollutant labels), so the Next.js front end can consume this
//! service without changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Pollutants tracked by the monitoring network.
///
/// Serialized with their display labels (`"PM2.5"`, `"NO2"`, ...) since that
/// is how the dashboard reports dominant pollutants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    // ---
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "O3")]
    O3,
}

impl Pollutant {
    // ---
    /// Fixed priority order, most health-critical first.
    ///
    /// Used to break ties when several pollutants share the maximum
    /// sub-index: PM2.5 wins over PM10, and so on down the list.
    pub const PRIORITY: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    pub fn label(&self) -> &'static str {
        // ---
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO2",
            Pollutant::So2 => "SO2",
            Pollutant::Co => "CO",
            Pollutant::O3 => "O3",
        }
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---

/// Per-pollutant concentrations for a single observation.
///
/// Units match the breakpoint tables: µg/m³ for PM2.5/PM10, ppb-scale for
/// NO2/SO2/O3, mg/m³ for CO. A `None` field means the pollutant was not
/// measured; it is excluded from aggregation, never treated as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    // ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm25: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm10: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub so2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub o3: Option<f64>,
}

impl PollutantReading {
    // ---
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        // ---
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::No2 => self.no2,
            Pollutant::So2 => self.so2,
            Pollutant::Co => self.co,
            Pollutant::O3 => self.o3,
        }
    }

    pub fn set(&mut self, pollutant: Pollutant, concentration: f64) {
        // ---
        let slot = match pollutant {
            Pollutant::Pm25 => &mut self.pm25,
            Pollutant::Pm10 => &mut self.pm10,
            Pollutant::No2 => &mut self.no2,
            Pollutant::So2 => &mut self.so2,
            Pollutant::Co => &mut self.co,
            Pollutant::O3 => &mut self.o3,
        };
        *slot = Some(concentration);
    }

    /// Iterate over the pollutants actually present, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::PRIORITY
            .into_iter()
            .filter_map(|p| self.get(p).map(|c| (p, c)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

// ---

/// US-EPA AQI category labels, a pure function of the index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiStatus {
    // ---
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl AqiStatus {
    // ---
    pub fn from_aqi(aqi: u16) -> Self {
        // ---
        match aqi {
            0..=50 => AqiStatus::Good,
            51..=100 => AqiStatus::Moderate,
            101..=150 => AqiStatus::UnhealthyForSensitiveGroups,
            151..=200 => AqiStatus::Unhealthy,
            201..=300 => AqiStatus::VeryUnhealthy,
            _ => AqiStatus::Hazardous,
        }
    }
}

/// Resolved overall AQI for one reading: the worst pollutant wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiResult {
    // ---
    /// Overall index, always in 0..=500.
    pub value: u16,
    pub dominant_pollutant: Pollutant,
    pub status: AqiStatus,
}

// ---

/// Operational state of a deployed sensor. Only `Online` sensors
/// participate in hyperlocal aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Online,
    Offline,
    Maintenance,
}

/// A single IoT sensor with its latest observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSample {
    // ---
    pub sensor_id: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub readings: PollutantReading,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub pressure: f64,
    pub battery_level: f64,
    pub signal_strength: f64,
    pub status: SensorStatus,
    pub last_calibration: DateTime<Utc>,
    pub next_calibration: DateTime<Utc>,
}

/// Fleet-level health summary across every registered sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorNetwork {
    // ---
    pub total_sensors: usize,
    pub online_sensors: usize,
    pub offline_sensors: usize,
    pub maintenance_sensors: usize,
    pub average_battery_level: f64,
    pub average_signal_strength: f64,
    pub last_update: DateTime<Utc>,
}

// ---

/// AQI derived from the sensors within a bounded radius of a point.
///
/// When `no_data` is set (zero sensors in range) the `aqi` and `confidence`
/// fields are zero and must not be treated as a valid reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperlocalResult {
    // ---
    pub location: String,
    pub aqi: u16,
    pub primary_pollutant: Option<Pollutant>,
    /// Heuristic 0..=100 score from the number of corroborating sensors.
    pub confidence: u8,
    pub sensor_count: usize,
    pub last_updated: DateTime<Utc>,
    pub recommendations: Vec<String>,
    pub no_data: bool,
}

// ---

/// One hour of (synthetic) past air quality with weather covariates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPoint {
    // ---
    pub timestamp: DateTime<Utc>,
    pub aqi: u16,
    pub pm25: f64,
    pub pm10: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

/// Broad weather regime attached to a forecast hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherFactor {
    // ---
    Normal,
    #[serde(rename = "High Wind")]
    HighWind,
    #[serde(rename = "Rain Expected")]
    RainExpected,
    #[serde(rename = "Stable Conditions")]
    StableConditions,
}

/// One hour of predicted air quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    // ---
    pub timestamp: DateTime<Utc>,
    pub aqi: u16,
    pub main_pollutant: Pollutant,
    /// 95 at the first forecast hour, decaying linearly to a floor of 60.
    pub confidence: u8,
    pub weather_factor: WeatherFactor,
}

/// Direction a series of AQI values is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_status_thresholds() {
        // ---
        assert_eq!(AqiStatus::from_aqi(0), AqiStatus::Good);
        assert_eq!(AqiStatus::from_aqi(50), AqiStatus::Good);
        assert_eq!(AqiStatus::from_aqi(51), AqiStatus::Moderate);
        assert_eq!(AqiStatus::from_aqi(100), AqiStatus::Moderate);
        assert_eq!(
            AqiStatus::from_aqi(101),
            AqiStatus::UnhealthyForSensitiveGroups
        );
        assert_eq!(
            AqiStatus::from_aqi(150),
            AqiStatus::UnhealthyForSensitiveGroups
        );
        assert_eq!(AqiStatus::from_aqi(151), AqiStatus::Unhealthy);
        assert_eq!(AqiStatus::from_aqi(200), AqiStatus::Unhealthy);
        assert_eq!(AqiStatus::from_aqi(201), AqiStatus::VeryUnhealthy);
        assert_eq!(AqiStatus::from_aqi(300), AqiStatus::VeryUnhealthy);
        assert_eq!(AqiStatus::from_aqi(301), AqiStatus::Hazardous);
        assert_eq!(AqiStatus::from_aqi(500), AqiStatus::Hazardous);
    }

    #[test]
    fn test_reading_iterates_in_priority_order() {
        // ---
        let reading = PollutantReading {
            o3: Some(30.0),
            pm25: Some(80.0),
            no2: Some(45.0),
            ..Default::default()
        };

        let present: Vec<Pollutant> = reading.iter().map(|(p, _)| p).collect();
        assert_eq!(present, vec![Pollutant::Pm25, Pollutant::No2, Pollutant::O3]);
    }

    #[test]
    fn test_empty_reading() {
        // ---
        let reading = PollutantReading::default();
        assert!(reading.is_empty());
        assert_eq!(reading.iter().count(), 0);

        let mut reading = reading;
        reading.set(Pollutant::Co, 2.5);
        assert!(!reading.is_empty());
        assert_eq!(reading.get(Pollutant::Co), Some(2.5));
        assert_eq!(reading.get(Pollutant::Pm25), None);
    }

    #[test]
    fn test_pollutant_labels_serialize() {
        // ---
        let json = serde_json::to_string(&Pollutant::Pm25).unwrap();
        assert_eq!(json, "\"PM2.5\"");
        let json = serde_json::to_string(&WeatherFactor::RainExpected).unwrap();
        assert_eq!(json, "\"Rain Expected\"");
        let json = serde_json::to_string(&AqiStatus::UnhealthyForSensitiveGroups).unwrap();
        assert_eq!(json, "\"Unhealthy for Sensitive Groups\"");
    }
}
