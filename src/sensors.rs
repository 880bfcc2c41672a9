//! In-memory registry for the Delhi-NCR IoT sensor network.
//!
//! Stands in for the real ingestion feed: `refresh` regenerates the mock
//! fleet and swaps the whole map under the write lock, so readers never see
//! a partially updated set. Everything downstream (hyperlocal aggregation,
//! the sensors endpoint) works off snapshots of this registry.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::{PollutantReading, SensorNetwork, SensorSample, SensorStatus};

// ---

pub struct SensorRegistry {
    sensors: RwLock<HashMap<String, SensorSample>>,
}

impl SensorRegistry {
    // ---
    pub fn new() -> Self {
        SensorRegistry {
            sensors: RwLock::new(HashMap::new()),
        }
    }

    /// Regenerate the mock fleet and replace the map wholesale.
    ///
    /// Returns the fresh snapshot, sorted by sensor id for stable output.
    pub fn refresh(&self, now: DateTime<Utc>) -> Vec<SensorSample> {
        // ---
        let fresh: HashMap<String, SensorSample> = mock_sensors(now)
            .into_iter()
            .map(|s| (s.sensor_id.clone(), s))
            .collect();

        let mut guard = self.sensors.write().unwrap_or_else(|e| e.into_inner());
        *guard = fresh;

        let mut snapshot: Vec<SensorSample> = guard.values().cloned().collect();
        snapshot.sort_by(|a, b| a.sensor_id.cmp(&b.sensor_id));
        snapshot
    }

    /// Current contents, sorted by sensor id.
    pub fn snapshot(&self) -> Vec<SensorSample> {
        // ---
        let guard = self.sensors.read().unwrap_or_else(|e| e.into_inner());
        let mut snapshot: Vec<SensorSample> = guard.values().cloned().collect();
        snapshot.sort_by(|a, b| a.sensor_id.cmp(&b.sensor_id));
        snapshot
    }

    /// Fleet health summary. `None` when the registry has never been
    /// refreshed (averaging over zero sensors is meaningless).
    pub fn network_status(&self, now: DateTime<Utc>) -> Option<SensorNetwork> {
        // ---
        let sensors = self.snapshot();
        if sensors.is_empty() {
            return None;
        }

        let count = |status: SensorStatus| sensors.iter().filter(|s| s.status == status).count();
        let total = sensors.len();
        let avg_battery =
            sensors.iter().map(|s| s.battery_level).sum::<f64>() / total as f64;
        let avg_signal =
            sensors.iter().map(|s| s.signal_strength).sum::<f64>() / total as f64;

        Some(SensorNetwork {
            total_sensors: total,
            online_sensors: count(SensorStatus::Online),
            offline_sensors: count(SensorStatus::Offline),
            maintenance_sensors: count(SensorStatus::Maintenance),
            average_battery_level: avg_battery.round(),
            average_signal_strength: avg_signal.round(),
            last_update: now,
        })
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---

struct MockSensor {
    // ---
    id: &'static str,
    location: &'static str,
    latitude: f64,
    longitude: f64,
    pm25: f64,
    pm10: f64,
    no2: f64,
    so2: f64,
    co: f64,
    o3: f64,
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    wind_direction: f64,
    pressure: f64,
    battery_level: f64,
    signal_strength: f64,
    status: SensorStatus,
    stale_minutes: i64,
    last_calibration: (i32, u32, u32, u32, u32),
}

// The fixed Delhi-NCR demo fleet. Rohini went dark half an hour ago and is
// reported offline.
const MOCK_FLEET: [MockSensor; 6] = [
    MockSensor {
        id: "iot-delhi-001",
        location: "Connaught Place",
        latitude: 28.6315,
        longitude: 77.2167,
        pm25: 85.2,
        pm10: 142.8,
        no2: 45.6,
        so2: 12.3,
        co: 2.1,
        o3: 38.9,
        temperature: 28.5,
        humidity: 65.0,
        wind_speed: 3.2,
        wind_direction: 180.0,
        pressure: 1013.2,
        battery_level: 87.0,
        signal_strength: 85.0,
        status: SensorStatus::Online,
        stale_minutes: 0,
        last_calibration: (2024, 1, 15, 10, 0),
    },
    MockSensor {
        id: "iot-delhi-002",
        location: "Karol Bagh",
        latitude: 28.6517,
        longitude: 77.1908,
        pm25: 92.4,
        pm10: 156.7,
        no2: 52.1,
        so2: 15.8,
        co: 2.8,
        o3: 42.3,
        temperature: 29.1,
        humidity: 68.0,
        wind_speed: 2.8,
        wind_direction: 165.0,
        pressure: 1012.8,
        battery_level: 92.0,
        signal_strength: 78.0,
        status: SensorStatus::Online,
        stale_minutes: 0,
        last_calibration: (2024, 1, 10, 14, 30),
    },
    MockSensor {
        id: "iot-delhi-003",
        location: "Lajpat Nagar",
        latitude: 28.5671,
        longitude: 77.2431,
        pm25: 78.9,
        pm10: 134.2,
        no2: 38.7,
        so2: 9.6,
        co: 1.9,
        o3: 35.4,
        temperature: 27.8,
        humidity: 62.0,
        wind_speed: 3.5,
        wind_direction: 195.0,
        pressure: 1013.5,
        battery_level: 95.0,
        signal_strength: 92.0,
        status: SensorStatus::Online,
        stale_minutes: 0,
        last_calibration: (2024, 1, 20, 9, 15),
    },
    MockSensor {
        id: "iot-gurgaon-001",
        location: "Cyber City",
        latitude: 28.4595,
        longitude: 77.0266,
        pm25: 88.7,
        pm10: 148.9,
        no2: 48.3,
        so2: 13.2,
        co: 2.4,
        o3: 40.1,
        temperature: 29.3,
        humidity: 70.0,
        wind_speed: 2.9,
        wind_direction: 170.0,
        pressure: 1012.1,
        battery_level: 78.0,
        signal_strength: 88.0,
        status: SensorStatus::Online,
        stale_minutes: 0,
        last_calibration: (2024, 1, 12, 11, 45),
    },
    MockSensor {
        id: "iot-noida-001",
        location: "Sector 18",
        latitude: 28.5355,
        longitude: 77.391,
        pm25: 91.3,
        pm10: 152.4,
        no2: 50.7,
        so2: 14.6,
        co: 2.6,
        o3: 41.8,
        temperature: 28.9,
        humidity: 66.0,
        wind_speed: 3.1,
        wind_direction: 185.0,
        pressure: 1012.9,
        battery_level: 83.0,
        signal_strength: 81.0,
        status: SensorStatus::Online,
        stale_minutes: 0,
        last_calibration: (2024, 1, 18, 16, 20),
    },
    MockSensor {
        id: "iot-delhi-004",
        location: "Rohini",
        latitude: 28.7041,
        longitude: 77.1025,
        pm25: 95.8,
        pm10: 161.2,
        no2: 55.4,
        so2: 16.9,
        co: 3.1,
        o3: 44.7,
        temperature: 30.2,
        humidity: 72.0,
        wind_speed: 2.6,
        wind_direction: 160.0,
        pressure: 1011.8,
        battery_level: 45.0,
        signal_strength: 65.0,
        status: SensorStatus::Offline,
        stale_minutes: 30,
        last_calibration: (2024, 1, 5, 8, 30),
    },
];

/// Build the mock fleet, stamping observation times relative to `now`.
fn mock_sensors(now: DateTime<Utc>) -> Vec<SensorSample> {
    // ---
    MOCK_FLEET
        .iter()
        .map(|unit| {
            let (y, mo, d, h, mi) = unit.last_calibration;
            let last_calibration = Utc
                .with_ymd_and_hms(y, mo, d, h, mi, 0)
                .single()
                .unwrap_or(now);
            SensorSample {
                sensor_id: unit.id.to_string(),
                location: unit.location.to_string(),
                latitude: unit.latitude,
                longitude: unit.longitude,
                timestamp: now - Duration::minutes(unit.stale_minutes),
                readings: PollutantReading {
                    pm25: Some(unit.pm25),
                    pm10: Some(unit.pm10),
                    no2: Some(unit.no2),
                    so2: Some(unit.so2),
                    co: Some(unit.co),
                    o3: Some(unit.o3),
                },
                temperature: unit.temperature,
                humidity: unit.humidity,
                wind_speed: unit.wind_speed,
                wind_direction: unit.wind_direction,
                pressure: unit.pressure,
                battery_level: unit.battery_level,
                signal_strength: unit.signal_strength,
                status: unit.status,
                last_calibration,
                next_calibration: last_calibration + Duration::days(31),
            }
        })
        .collect()
}
