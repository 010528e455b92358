//! Which constellations get usefully high during tonight's dark hours.
//!
//! Each reference star is sampled hourly from sunset to sunrise. A
//! constellation counts as visible tonight when its star climbs above
//! [`VISIBILITY_THRESHOLD_DEG`] at any sample.

use chrono::{DateTime, Datelike, Duration, Utc};
use log::debug;

use crate::catalog::{self, ReferenceStar};
use crate::error::{SkyError, SkyResult};
use crate::geometry::CompassOctant;
use crate::observer::ObserverLocation;
use crate::solar::{NightWindow, SunTimes};

pub const VISIBILITY_THRESHOLD_DEG: f64 = 10.0;
pub const MAX_RESULTS: usize = 10;
pub const SAMPLE_STEP_MINUTES: i64 = 60;

/// Upper bound on samples per star: one full day of steps plus the end point.
const MAX_SAMPLES: usize = (24 * 60 / SAMPLE_STEP_MINUTES) as usize + 1;

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityRecord {
    pub constellation: String,
    pub star: String,
    pub description: String,
    pub max_altitude: f64,
    pub time_of_max: DateTime<Utc>,
    pub current_altitude: f64,
    pub current_azimuth: f64,
    pub is_visible_now: bool,
    /// Set when nothing qualified and this entry is the month's stand-in.
    pub seasonal_default: bool,
}

impl VisibilityRecord {
    pub fn direction(&self) -> CompassOctant {
        CompassOctant::from_azimuth(self.current_azimuth)
    }

    pub fn altitude_display(&self) -> String {
        if self.is_visible_now {
            format!(
                "{:.0}° {} now",
                self.current_altitude,
                self.direction().as_str()
            )
        } else {
            format!("Rises later ({:.0}° max)", self.max_altitude)
        }
    }
}

fn sample_star(
    star: &ReferenceStar,
    observer: &ObserverLocation,
    window: &NightWindow,
    now: DateTime<Utc>,
) -> VisibilityRecord {
    let step = Duration::minutes(SAMPLE_STEP_MINUTES);

    let mut max_altitude = f64::NEG_INFINITY;
    let mut time_of_max = window.sunset;

    let mut t = window.sunset;
    let mut samples = 0;
    while t < window.sunrise && samples < MAX_SAMPLES {
        let altitude = star.horizontal(observer, t).altitude;
        if altitude > max_altitude {
            max_altitude = altitude;
            time_of_max = t;
        }
        t = t + step;
        samples += 1;
    }

    let current = star.horizontal(observer, now);
    let in_window = window.contains(now);

    // The query instant is always one point of the series
    if current.altitude > max_altitude {
        max_altitude = current.altitude;
        time_of_max = now;
    }

    VisibilityRecord {
        constellation: star.constellation.to_string(),
        star: star.star.to_string(),
        description: star.description.to_string(),
        max_altitude,
        time_of_max,
        current_altitude: current.altitude,
        current_azimuth: current.azimuth,
        is_visible_now: in_window && current.altitude > 0.0,
        seasonal_default: false,
    }
}

/// Calendar month at the observer by mean solar time.
pub fn local_month(observer: &ObserverLocation, now: DateTime<Utc>) -> u32 {
    (now + SunTimes::mean_solar_offset(observer.longitude)).month()
}

/// Scan `catalog` over `window`, keeping stars that clear the threshold.
///
/// Sorted by descending peak altitude; ties keep catalog order. At most
/// [`MAX_RESULTS`] entries, possibly none.
pub fn scan_night(
    observer: &ObserverLocation,
    window: &NightWindow,
    now: DateTime<Utc>,
    catalog: &[ReferenceStar],
) -> SkyResult<Vec<VisibilityRecord>> {
    if window.sunrise <= window.sunset {
        return Err(SkyError::InvalidWindow {
            sunset: window.sunset,
            sunrise: window.sunrise,
        });
    }

    let mut visible: Vec<VisibilityRecord> = catalog
        .iter()
        .map(|star| sample_star(star, observer, window, now))
        .filter(|record| record.max_altitude > VISIBILITY_THRESHOLD_DEG)
        .collect();

    // sort_by is stable
    visible.sort_by(|a, b| b.max_altitude.total_cmp(&a.max_altitude));
    visible.truncate(MAX_RESULTS);

    Ok(visible)
}

/// Like [`scan_night`], but never empty: when nothing qualifies the seasonal
/// default constellation for the observer's local month is returned on its own.
pub fn visible_tonight(
    observer: &ObserverLocation,
    window: &NightWindow,
    now: DateTime<Utc>,
    catalog: &[ReferenceStar],
) -> SkyResult<Vec<VisibilityRecord>> {
    let visible = scan_night(observer, window, now, catalog)?;
    if !visible.is_empty() {
        return Ok(visible);
    }

    let fallback = catalog::seasonal_default(local_month(observer, now));
    debug!(
        "no constellation above {}° at {:.2},{:.2}; showing {}",
        VISIBILITY_THRESHOLD_DEG, observer.latitude, observer.longitude, fallback.constellation
    );

    let mut record = sample_star(fallback, observer, window, now);
    record.seasonal_default = true;
    Ok(vec![record])
}

#[derive(Debug, Clone, PartialEq)]
pub struct NightSummary {
    pub sunset: DateTime<Utc>,
    pub total_tonight: usize,
    pub visible_now: usize,
    pub rising_later: usize,
}

impl NightSummary {
    pub fn from_records(window: &NightWindow, records: &[VisibilityRecord]) -> Self {
        let visible_now = records.iter().filter(|r| r.is_visible_now).count();
        NightSummary {
            sunset: window.sunset,
            total_tonight: records.len(),
            visible_now,
            rising_later: records.len() - visible_now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::REFERENCE_STARS;
    use chrono::{NaiveDate, TimeZone};

    fn austin() -> ObserverLocation {
        ObserverLocation::new("Austin", 30.2672, -97.7431, 0.0).unwrap()
    }

    fn june_night() -> NightWindow {
        NightWindow::following(30.2672, -97.7431, NaiveDate::from_ymd_opt(2024, 6, 20).unwrap())
            .unwrap()
    }

    #[test]
    fn test_scan_is_sorted_and_capped() {
        let window = june_night();
        let now = window.sunset + Duration::hours(3);
        let records = scan_night(&austin(), &window, now, &REFERENCE_STARS).unwrap();

        assert_eq!(records.len(), MAX_RESULTS);
        assert!(records
            .windows(2)
            .all(|w| w[0].max_altitude >= w[1].max_altitude));
        assert!(records.iter().all(|r| r.max_altitude > VISIBILITY_THRESHOLD_DEG));
        assert_eq!(records[0].constellation, "Lyra");
    }

    #[test]
    fn test_max_altitude_covers_current_sample() {
        let window = june_night();
        let now = window.sunset + Duration::minutes(200);
        for record in scan_night(&austin(), &window, now, &REFERENCE_STARS).unwrap() {
            assert!(record.max_altitude >= record.current_altitude);
            assert!(window.contains(record.time_of_max));
        }
    }

    #[test]
    fn test_visible_now_flag_follows_altitude() {
        let window = june_night();
        let now = window.sunset + Duration::hours(2);
        for record in scan_night(&austin(), &window, now, &REFERENCE_STARS).unwrap() {
            assert_eq!(record.is_visible_now, record.current_altitude > 0.0);
            if record.is_visible_now {
                assert!(record.altitude_display().ends_with("now"));
            } else {
                assert!(record.altitude_display().starts_with("Rises later"));
            }
        }
    }

    #[test]
    fn test_max_altitude_covers_daytime_sample() {
        let window = june_night();
        for hours in 1..=13 {
            let now = window.sunset - Duration::hours(hours);
            for record in scan_night(&austin(), &window, now, &REFERENCE_STARS).unwrap() {
                assert!(
                    record.max_altitude >= record.current_altitude,
                    "{}h before sunset: {} max {} now {}",
                    hours,
                    record.constellation,
                    record.max_altitude,
                    record.current_altitude
                );
                assert!(!record.is_visible_now);
            }
        }
    }

    #[test]
    fn test_daytime_query_is_never_visible_now() {
        let window = june_night();
        let noon = window.sunset - Duration::hours(7);
        let records = scan_night(&austin(), &window, noon, &REFERENCE_STARS).unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| !r.is_visible_now));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let window = june_night();
        let now = window.sunset;
        let twins = [REFERENCE_STARS[10], REFERENCE_STARS[10]];
        let mut second = twins[1];
        second.constellation = "Lyra (copy)";
        let records =
            scan_night(&austin(), &window, now, &[twins[0], second]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].constellation, "Lyra");
        assert_eq!(records[1].constellation, "Lyra (copy)");
    }

    #[test]
    fn test_rejects_inverted_window() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 2, 0, 0).unwrap();
        let window = NightWindow {
            sunset: t,
            sunrise: t - Duration::hours(1),
        };
        assert!(matches!(
            scan_night(&austin(), &window, t, &REFERENCE_STARS),
            Err(SkyError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_sampling_is_bounded_for_long_windows() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap();
        let window = NightWindow::new(t, t + Duration::days(3650)).unwrap();
        let records = scan_night(&austin(), &window, t, &REFERENCE_STARS).unwrap();
        assert!(records.len() <= MAX_RESULTS);
        let latest = t + Duration::minutes(SAMPLE_STEP_MINUTES * MAX_SAMPLES as i64);
        assert!(records.iter().all(|r| r.time_of_max <= latest));
    }

    #[test]
    fn test_empty_scan_falls_back_to_seasonal_default() {
        let window = june_night();
        let now = window.sunset + Duration::hours(1);
        let records = visible_tonight(&austin(), &window, now, &[]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].constellation, "Cygnus");
        assert!(records[0].seasonal_default);
    }

    #[test]
    fn test_fallback_uses_observer_month() {
        // 21:29 on Aug 31 by Austin mean time, already September in UTC
        let now = Utc.with_ymd_and_hms(2024, 9, 1, 4, 0, 0).unwrap();
        let window = NightWindow::current_or_next(30.2672, -97.7431, now).unwrap();
        assert_eq!(local_month(&austin(), now), 8);

        let records = visible_tonight(&austin(), &window, now, &[]).unwrap();
        assert_eq!(records[0].constellation, "Cygnus");

        let tokyo = ObserverLocation::new("Tokyo", 35.6762, 139.6503, 40.0).unwrap();
        assert_eq!(local_month(&tokyo, now), 9);
    }

    #[test]
    fn test_south_pole_still_returns_something() {
        let pole = ObserverLocation::new("Amundsen-Scott", -89.9, 0.0, 2835.0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 20, 20, 0, 0).unwrap();
        let window = NightWindow::current_or_next(pole.latitude, pole.longitude, now).unwrap();
        let records = visible_tonight(&pole, &window, now, &REFERENCE_STARS).unwrap();
        assert!(!records.is_empty() && records.len() <= MAX_RESULTS);
    }

    #[test]
    fn test_summary_counts() {
        let window = june_night();
        let now = window.sunset + Duration::hours(1);
        let records = visible_tonight(&austin(), &window, now, &REFERENCE_STARS).unwrap();
        let summary = NightSummary::from_records(&window, &records);
        assert_eq!(summary.total_tonight, records.len());
        assert_eq!(summary.visible_now + summary.rising_later, summary.total_tonight);
        assert_eq!(summary.sunset, window.sunset);
    }
}
