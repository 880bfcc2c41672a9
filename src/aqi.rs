//! US-EPA style AQI computation.
//!
//! Each pollutant carries a fixed table of piecewise-linear breakpoints that
//! maps a raw concentration to a 0..=500 sub-index. The overall AQI for a
//! reading is the worst sub-index across the pollutants present, with ties
//! broken by a fixed health-priority order.
//!
//! Everything in this module is deterministic and side-effect free.

use crate::models::{AqiResult, AqiStatus, Pollutant, PollutantReading};

// ---

/// Index ceiling: concentrations beyond every table band clamp here.
pub const MAX_AQI: u16 = 500;

/// One band of a piecewise-linear concentration-to-index mapping.
///
/// `c_low..=c_high` maps linearly onto `i_low..=i_high`. Tables are ordered
/// and non-overlapping; lookup treats each band as covering everything up to
/// its `c_high`, so the published gaps between bands (e.g. PM2.5 12.0/12.1)
/// still resolve to a sensible index.
#[derive(Debug, Clone, Copy)]
struct Breakpoint {
    // ---
    c_low: f64,
    c_high: f64,
    i_low: u16,
    i_high: u16,
}

const fn bp(c_low: f64, c_high: f64, i_low: u16, i_high: u16) -> Breakpoint {
    Breakpoint {
        c_low,
        c_high,
        i_low,
        i_high,
    }
}

// Breakpoint tables per pollutant, US-EPA scale.
// PM2.5/PM10 in µg/m³, NO2/SO2/O3 in ppb, CO in mg/m³.

const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 12.0, 0, 50),
    bp(12.1, 35.4, 51, 100),
    bp(35.5, 55.4, 101, 150),
    bp(55.5, 150.4, 151, 200),
    bp(150.5, 250.4, 201, 300),
    bp(250.5, 500.4, 301, 500),
];

const PM10_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 54.0, 0, 50),
    bp(55.0, 154.0, 51, 100),
    bp(155.0, 254.0, 101, 150),
    bp(255.0, 354.0, 151, 200),
    bp(355.0, 424.0, 201, 300),
    bp(425.0, 604.0, 301, 500),
];

const NO2_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 53.0, 0, 50),
    bp(54.0, 100.0, 51, 100),
    bp(101.0, 360.0, 101, 150),
    bp(361.0, 649.0, 151, 200),
    bp(650.0, 1249.0, 201, 300),
    bp(1250.0, 2049.0, 301, 500),
];

const SO2_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 35.0, 0, 50),
    bp(36.0, 75.0, 51, 100),
    bp(76.0, 185.0, 101, 150),
    bp(186.0, 304.0, 151, 200),
    bp(305.0, 604.0, 201, 300),
    bp(605.0, 1004.0, 301, 500),
];

const CO_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 4.4, 0, 50),
    bp(4.5, 9.4, 51, 100),
    bp(9.5, 12.4, 101, 150),
    bp(12.5, 15.4, 151, 200),
    bp(15.5, 30.4, 201, 300),
    bp(30.5, 50.4, 301, 500),
];

// O3 has no 301..=500 band: concentrations above 200 ppb clamp straight to
// 500 via the fallthrough. Kept as-is for compatibility with the dashboard's
// published index values.
const O3_BREAKPOINTS: [Breakpoint; 5] = [
    bp(0.0, 54.0, 0, 50),
    bp(55.0, 70.0, 51, 100),
    bp(71.0, 85.0, 101, 150),
    bp(86.0, 105.0, 151, 200),
    bp(106.0, 200.0, 201, 300),
];

fn breakpoints(pollutant: Pollutant) -> &'static [Breakpoint] {
    // ---
    match pollutant {
        Pollutant::Pm25 => &PM25_BREAKPOINTS,
        Pollutant::Pm10 => &PM10_BREAKPOINTS,
        Pollutant::No2 => &NO2_BREAKPOINTS,
        Pollutant::So2 => &SO2_BREAKPOINTS,
        Pollutant::Co => &CO_BREAKPOINTS,
        Pollutant::O3 => &O3_BREAKPOINTS,
    }
}

// ---

/// Convert a raw concentration to its 0..=500 AQI sub-index.
///
/// Negative inputs clamp to zero. Concentrations above the last band of the
/// pollutant's table return [`MAX_AQI`] rather than extrapolating.
///
/// ```text
/// subIndex = (iHigh - iLow) / (cHigh - cLow) * (c - cLow) + iLow
/// ```
pub fn sub_index(pollutant: Pollutant, concentration: f64) -> u16 {
    // ---
    let c = concentration.max(0.0);

    for band in breakpoints(pollutant) {
        if c <= band.c_high {
            let slope = f64::from(band.i_high - band.i_low) / (band.c_high - band.c_low);
            let index = slope * (c - band.c_low) + f64::from(band.i_low);
            return index.round().clamp(0.0, f64::from(MAX_AQI)) as u16;
        }
    }

    MAX_AQI
}

/// Resolve a multi-pollutant reading to its overall AQI.
///
/// The reported AQI is the maximum sub-index; the dominant pollutant is the
/// argmax, with ties going to the earlier entry of [`Pollutant::PRIORITY`].
/// Missing pollutants are excluded from the max (not treated as zero); a
/// reading with no pollutants at all yields `None`.
pub fn resolve(reading: &PollutantReading) -> Option<AqiResult> {
    // ---
    let mut best: Option<(Pollutant, u16)> = None;

    for (pollutant, concentration) in reading.iter() {
        let index = sub_index(pollutant, concentration);
        match best {
            Some((_, current)) if index <= current => {}
            _ => best = Some((pollutant, index)),
        }
    }

    best.map(|(pollutant, value)| AqiResult {
        value,
        dominant_pollutant: pollutant,
        status: AqiStatus::from_aqi(value),
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_pm25_band_edges() {
        // ---
        // Expected values cross-checked against the EPA concentration
        // calculator at https://www.airnow.gov/aqi/aqi-calculator-concentration/
        assert_eq!(sub_index(Pollutant::Pm25, 0.0), 0);
        assert_eq!(sub_index(Pollutant::Pm25, 12.0), 50);
        assert_eq!(sub_index(Pollutant::Pm25, 12.1), 51);
        assert_eq!(sub_index(Pollutant::Pm25, 35.4), 100);
        assert_eq!(sub_index(Pollutant::Pm25, 35.5), 101);
        assert_eq!(sub_index(Pollutant::Pm25, 55.4), 150);
        assert_eq!(sub_index(Pollutant::Pm25, 150.4), 200);
        assert_eq!(sub_index(Pollutant::Pm25, 250.4), 300);
        assert_eq!(sub_index(Pollutant::Pm25, 250.5), 301);
        assert_eq!(sub_index(Pollutant::Pm25, 500.4), 500);
    }

    #[test]
    fn test_interpolation_worked_example() {
        // ---
        // 40 µg/m³ falls in the [35.5, 55.4] -> [101, 150] band:
        // (150-101)/(55.4-35.5) * (40-35.5) + 101 = 112.08...
        assert_eq!(sub_index(Pollutant::Pm25, 40.0), 112);
    }

    #[test]
    fn test_lowest_band_stays_good() {
        // ---
        for c in [0.0, 1.0, 5.5, 9.3, 11.9, 12.0] {
            let index = sub_index(Pollutant::Pm25, c);
            assert!(index <= 50, "PM2.5 {c} gave {index}, expected Good band");
        }
        for c in [0.0, 10.0, 30.0, 54.0] {
            assert!(sub_index(Pollutant::Pm10, c) <= 50);
        }
    }

    #[test]
    fn test_above_table_clamps_to_500() {
        // ---
        assert_eq!(sub_index(Pollutant::Pm25, 501.0), 500);
        assert_eq!(sub_index(Pollutant::Pm25, 10_000.0), 500);
        assert_eq!(sub_index(Pollutant::Pm10, 605.0), 500);
        assert_eq!(sub_index(Pollutant::No2, 2050.0), 500);
        assert_eq!(sub_index(Pollutant::So2, 1005.0), 500);
        assert_eq!(sub_index(Pollutant::Co, 50.5), 500);
    }

    #[test]
    fn test_negative_concentration_clamps_to_zero() {
        // ---
        assert_eq!(sub_index(Pollutant::Pm25, -5.0), 0);
        assert_eq!(sub_index(Pollutant::O3, -0.1), 0);
    }

    #[test]
    fn test_o3_table_tops_out_at_300() {
        // ---
        assert_eq!(sub_index(Pollutant::O3, 200.0), 300);
        // Above the truncated table the fallthrough clamp applies.
        assert_eq!(sub_index(Pollutant::O3, 200.1), 500);
        assert_eq!(sub_index(Pollutant::O3, 250.0), 500);
    }

    #[test]
    fn test_table_gaps_resolve() {
        // ---
        // 12.05 sits between the PM2.5 Good and Moderate bands as published;
        // lookup attaches it to the Moderate band instead of falling through.
        let index = sub_index(Pollutant::Pm25, 12.05);
        assert!((50..=51).contains(&index), "gap value gave {index}");
    }

    #[test]
    fn test_resolve_takes_worst_pollutant() {
        // ---
        let reading = PollutantReading {
            pm25: Some(85.2),
            pm10: Some(142.8),
            no2: Some(45.6),
            so2: Some(12.3),
            co: Some(2.1),
            o3: Some(38.9),
        };

        let result = resolve(&reading).unwrap();
        let expected = Pollutant::PRIORITY
            .into_iter()
            .filter_map(|p| reading.get(p).map(|c| sub_index(p, c)))
            .max()
            .unwrap();

        assert_eq!(result.value, expected);
        assert_eq!(result.dominant_pollutant, Pollutant::Pm25);
        assert_eq!(result.status, AqiStatus::Unhealthy);
    }

    #[test]
    fn test_resolve_tie_break_prefers_priority_order() {
        // ---
        // PM2.5 at 12.0 and PM10 at 54.0 both map to exactly 50.
        let reading = PollutantReading {
            pm25: Some(12.0),
            pm10: Some(54.0),
            ..Default::default()
        };

        let result = resolve(&reading).unwrap();
        assert_eq!(result.value, 50);
        assert_eq!(result.dominant_pollutant, Pollutant::Pm25);
    }

    #[test]
    fn test_resolve_skips_missing_pollutants() {
        // ---
        let reading = PollutantReading {
            no2: Some(120.0),
            ..Default::default()
        };

        let result = resolve(&reading).unwrap();
        assert_eq!(result.dominant_pollutant, Pollutant::No2);
        assert_eq!(result.value, sub_index(Pollutant::No2, 120.0));
    }

    #[test]
    fn test_resolve_empty_reading_is_none() {
        assert!(resolve(&PollutantReading::default()).is_none());
    }
}
