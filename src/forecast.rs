//! Synthetic history generation, 72-hour forecasting, and trend labelling.
//!
//! The historical generator produces a plausible hourly AQI series for the
//! region (diurnal rush-hour peaks, quieter nights and weekends); the
//! forecast engine extrapolates it forward with a short moving average
//! scaled by time-of-day and seasonal factors.
//!
//! Both take the clock and the random source as parameters so tests can pin
//! `now` and seed the RNG for reproducible output.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use rand::Rng;

use crate::models::{ForecastPoint, HistoricalPoint, Pollutant, Trend, WeatherFactor};

// ---

/// Regional baseline AQI the synthetic history oscillates around.
pub const BASE_AQI: f64 = 120.0;

/// Number of trailing points fed into the forecast moving average.
const MOVING_AVERAGE_WINDOW: usize = 5;

// ---

/// Generate `hours_back + 1` hourly points, oldest first, ending at `now`.
///
/// Each point starts from [`BASE_AQI`], applies rush-hour / night / weekend
/// modifiers and uniform noise, and is clamped to 30..=400. Pollutant
/// concentrations are derived from the final AQI; weather covariates are
/// independent uniform draws.
pub fn generate_historical(
    hours_back: u32,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<HistoricalPoint> {
    // ---
    let mut points = Vec::with_capacity(hours_back as usize + 1);

    for i in (0..=hours_back).rev() {
        let timestamp = now - Duration::hours(i64::from(i));
        let hour = timestamp.hour();

        let mut aqi = BASE_AQI;
        if (7..=10).contains(&hour) {
            aqi += 40.0; // morning rush
        } else if (17..=20).contains(&hour) {
            aqi += 50.0; // evening rush
        } else if hour >= 22 || hour <= 6 {
            aqi -= 30.0; // night
        }

        if matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun) {
            aqi -= 20.0;
        }

        aqi += rng.gen_range(-30.0..30.0);
        let aqi = aqi.clamp(30.0, 400.0);

        points.push(HistoricalPoint {
            timestamp,
            aqi: aqi.round() as u16,
            pm25: (aqi * 0.6 + rng.gen_range(0.0..20.0)).round().max(0.0),
            pm10: (aqi * 0.8 + rng.gen_range(0.0..30.0)).round().max(0.0),
            temperature: rng.gen_range(20.0f64..35.0).round(),
            humidity: rng.gen_range(40.0f64..80.0).round(),
            wind_speed: (rng.gen_range(2.0f64..10.0) * 10.0).round() / 10.0,
        });
    }

    points
}

// ---

/// Extrapolate `hours_forward` hourly points starting at `now + 1h`.
///
/// The base is a moving average of the last [`MOVING_AVERAGE_WINDOW`]
/// historical values (fewer if the series is shorter, [`BASE_AQI`] if it is
/// empty), scaled per hour by time-of-day, seasonal, and random factors.
/// Confidence decays linearly from 95 to a floor of 60.
pub fn generate_forecast(
    historical: &[HistoricalPoint],
    hours_forward: u32,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<ForecastPoint> {
    // ---
    let window = &historical[historical.len().saturating_sub(MOVING_AVERAGE_WINDOW)..];
    let base = if window.is_empty() {
        BASE_AQI
    } else {
        window.iter().map(|p| f64::from(p.aqi)).sum::<f64>() / window.len() as f64
    };

    let mut forecast = Vec::with_capacity(hours_forward as usize);

    for i in 0..hours_forward {
        let timestamp = now + Duration::hours(i64::from(i) + 1);

        let time_factor = time_of_day_factor(timestamp.hour());
        let seasonal_factor = seasonal_factor(timestamp.month());
        let random_factor = rng.gen_range(0.9..1.1);

        let aqi = (base * time_factor * seasonal_factor * random_factor)
            .round()
            .clamp(20.0, 500.0) as u16;

        let weather_factor = if i < 24 && rng.gen_bool(0.3) {
            WeatherFactor::HighWind
        } else if (24..48).contains(&i) && rng.gen_bool(0.2) {
            WeatherFactor::RainExpected
        } else if i >= 48 && rng.gen_bool(0.4) {
            WeatherFactor::StableConditions
        } else {
            WeatherFactor::Normal
        };

        let main_pollutant = if aqi > 200 {
            Pollutant::Pm10
        } else if aqi > 150 && rng.gen_bool(0.5) {
            Pollutant::No2
        } else {
            Pollutant::Pm25
        };

        forecast.push(ForecastPoint {
            timestamp,
            aqi,
            main_pollutant,
            confidence: (95.0 - 0.5 * f64::from(i)).max(60.0).round() as u8,
            weather_factor,
        });
    }

    forecast
}

fn time_of_day_factor(hour: u32) -> f64 {
    // ---
    if (7..=10).contains(&hour) {
        1.3
    } else if (17..=20).contains(&hour) {
        1.4
    } else if hour >= 22 || hour <= 6 {
        0.8
    } else {
        1.0
    }
}

fn seasonal_factor(month: u32) -> f64 {
    // Nov-Mar: winter inversion layer traps pollution over the region.
    if month >= 11 || month <= 3 {
        1.5
    } else {
        1.0
    }
}

// ---

/// Label a series as improving, worsening, or stable by comparing the mean
/// of the last 6 values against the mean of the 6 before those.
///
/// Series too short to form both windows (fewer than 2 points, or no values
/// left for the earlier window) are reported stable.
pub fn classify(series: &[u16]) -> Trend {
    // ---
    if series.len() < 2 {
        return Trend::Stable;
    }

    let split = series.len().saturating_sub(6);
    let recent = &series[split..];
    let earlier = &series[series.len().saturating_sub(12)..split];

    if recent.is_empty() || earlier.is_empty() {
        return Trend::Stable;
    }

    let mean = |s: &[u16]| s.iter().map(|&v| f64::from(v)).sum::<f64>() / s.len() as f64;
    let difference = mean(recent) - mean(earlier);

    if difference > 10.0 {
        Trend::Worsening
    } else if difference < -10.0 {
        Trend::Improving
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};

    fn test_now() -> DateTime<Utc> {
        // A Wednesday, mid-January (winter season).
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_historical_length_and_spacing() {
        // ---
        let mut rng = StdRng::seed_from_u64(7);
        let points = generate_historical(168, test_now(), &mut rng);

        assert_eq!(points.len(), 169);
        assert_eq!(points.last().unwrap().timestamp, test_now());

        for pair in points.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::hours(1));
        }
    }

    #[test]
    fn test_historical_values_stay_in_range() {
        // ---
        let mut rng = StdRng::seed_from_u64(7);
        for point in generate_historical(168, test_now(), &mut rng) {
            assert!((30..=400).contains(&point.aqi), "aqi {}", point.aqi);
            assert!(point.pm25 >= 0.0);
            assert!(point.pm10 >= 0.0);
            assert!((20.0..=35.0).contains(&point.temperature));
            assert!((40.0..=80.0).contains(&point.humidity));
            assert!((2.0..=10.0).contains(&point.wind_speed));
        }
    }

    #[test]
    fn test_historical_diurnal_pattern() {
        // ---
        // Noise is ±30, so a weekday morning-rush point (base 160) can never
        // dip below a weekday night point's ceiling (base 90) plus overlap:
        // rush is in [130, 190], night in [60, 120].
        let mut rng = StdRng::seed_from_u64(42);
        let points = generate_historical(168, test_now(), &mut rng);

        for point in &points {
            let hour = point.timestamp.hour();
            let weekend = matches!(
                point.timestamp.weekday(),
                Weekday::Sat | Weekday::Sun
            );
            if weekend {
                continue;
            }
            if (7..=10).contains(&hour) {
                assert!((130..=190).contains(&point.aqi), "rush hour aqi {}", point.aqi);
            } else if hour >= 22 || hour <= 6 {
                assert!((60..=120).contains(&point.aqi), "night aqi {}", point.aqi);
            }
        }
    }

    #[test]
    fn test_historical_is_deterministic_under_seed() {
        // ---
        let a = generate_historical(48, test_now(), &mut StdRng::seed_from_u64(99));
        let b = generate_historical(48, test_now(), &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_forecast_timestamps_start_one_hour_out() {
        // ---
        let mut rng = StdRng::seed_from_u64(7);
        let historical = generate_historical(168, test_now(), &mut rng);
        let forecast = generate_forecast(&historical, 72, test_now(), &mut rng);

        assert_eq!(forecast.len(), 72);
        assert_eq!(
            forecast[0].timestamp,
            test_now() + Duration::hours(1)
        );
        for pair in forecast.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::hours(1));
        }
    }

    #[test]
    fn test_forecast_confidence_decays_to_floor() {
        // ---
        let mut rng = StdRng::seed_from_u64(7);
        let historical = generate_historical(168, test_now(), &mut rng);
        let forecast = generate_forecast(&historical, 72, test_now(), &mut rng);

        assert_eq!(forecast[0].confidence, 95);
        assert_eq!(forecast[20].confidence, 85);
        assert_eq!(forecast[70].confidence, 60);
        assert_eq!(forecast[71].confidence, 60);

        let mut last = 100;
        for point in &forecast {
            assert!(point.confidence <= last);
            assert!(point.confidence >= 60);
            last = point.confidence;
        }
    }

    #[test]
    fn test_forecast_values_stay_in_range() {
        // ---
        let mut rng = StdRng::seed_from_u64(11);
        let historical = generate_historical(168, test_now(), &mut rng);
        for point in generate_forecast(&historical, 72, test_now(), &mut rng) {
            assert!((20..=500).contains(&point.aqi));
            assert!(matches!(
                point.main_pollutant,
                Pollutant::Pm25 | Pollutant::Pm10 | Pollutant::No2
            ));
        }
    }

    #[test]
    fn test_forecast_handles_short_history() {
        // ---
        let mut rng = StdRng::seed_from_u64(7);
        let historical = generate_historical(2, test_now(), &mut rng);
        let forecast = generate_forecast(&historical, 72, test_now(), &mut rng);
        assert_eq!(forecast.len(), 72);

        // Empty history falls back to the baseline instead of NaN.
        let forecast = generate_forecast(&[], 12, test_now(), &mut rng);
        assert_eq!(forecast.len(), 12);
        for point in forecast {
            assert!((20..=500).contains(&point.aqi));
        }
    }

    #[test]
    fn test_seasonal_factor_months() {
        // ---
        for month in [11, 12, 1, 2, 3] {
            assert_eq!(seasonal_factor(month), 1.5);
        }
        for month in [4, 5, 6, 7, 8, 9, 10] {
            assert_eq!(seasonal_factor(month), 1.0);
        }
    }

    #[test]
    fn test_time_of_day_factors() {
        // ---
        assert_eq!(time_of_day_factor(8), 1.3);
        assert_eq!(time_of_day_factor(18), 1.4);
        assert_eq!(time_of_day_factor(23), 0.8);
        assert_eq!(time_of_day_factor(3), 0.8);
        assert_eq!(time_of_day_factor(13), 1.0);
    }

    #[test]
    fn test_classify_flat_series_is_stable() {
        // ---
        assert_eq!(classify(&[100; 24]), Trend::Stable);
    }

    #[test]
    fn test_classify_worsening_and_improving() {
        // ---
        // Earlier window averages 100, recent averages 150.
        let mut rising = vec![100u16; 6];
        rising.extend([150u16; 6]);
        assert_eq!(classify(&rising), Trend::Worsening);

        let mut falling = vec![150u16; 6];
        falling.extend([100u16; 6]);
        assert_eq!(classify(&falling), Trend::Improving);
    }

    #[test]
    fn test_classify_small_drift_is_stable() {
        // ---
        let mut series = vec![100u16; 6];
        series.extend([108u16; 6]);
        assert_eq!(classify(&series), Trend::Stable);
    }

    #[test]
    fn test_classify_short_series_is_stable() {
        // ---
        assert_eq!(classify(&[]), Trend::Stable);
        assert_eq!(classify(&[100]), Trend::Stable);
        // Six points leave nothing for the earlier window.
        assert_eq!(classify(&[10, 20, 200, 250, 300, 350]), Trend::Stable);
        // Seven points give a one-element earlier window.
        assert_eq!(classify(&[10, 200, 200, 200, 200, 200, 200]), Trend::Worsening);
    }

    #[test]
    fn test_history_feeds_forecast_round_trip() {
        // ---
        let mut rng = StdRng::seed_from_u64(5);
        let historical = generate_historical(168, test_now(), &mut rng);
        let forecast = generate_forecast(&historical, 72, test_now(), &mut rng);

        assert_eq!(forecast.len(), 72);
        let aqis: Vec<u16> = forecast.iter().map(|p| p.aqi).collect();
        // Classifying the forecast itself must not panic either.
        let _ = classify(&aqis);
    }
}
