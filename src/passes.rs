use chrono::{DateTime, Duration, Timelike, Utc};
use log::warn;
use nalgebra::Vector3;

use crate::coords::calculate_gmst;
use crate::error::{SkyError, SkyResult};
use crate::iss::{magnitude_from_pass_duration, PassType};
use crate::observer::ObserverLocation;
use crate::orbit::Satellite;
use crate::solar::SunTimes;

/// Element sets older than this still predict, with a warning.
const STALE_TLE_DAYS: i64 = 30;
/// Element sets older than this are refused.
const EXPIRED_TLE_DAYS: i64 = 90;

#[derive(Debug, Clone)]
pub struct SatellitePass {
    pub aos_time: DateTime<Utc>, // Acquisition of Signal
    pub los_time: DateTime<Utc>, // Loss of Signal
    pub max_elevation: f64,
    pub max_elevation_time: DateTime<Utc>,
    pub aos_azimuth: f64,
    pub max_azimuth: f64,
    pub los_azimuth: f64,
    pub duration_seconds: f64,
    pub max_range_km: f64,
    pub pass_type: PassType,
    pub magnitude: f64,
}

#[derive(Debug)]
pub struct LookAngles {
    pub azimuth: f64,   // degrees
    pub elevation: f64, // degrees
    pub range: f64,     // kilometers
}

/// How far and how finely to search for passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassSearch {
    pub num_passes: usize,
    pub min_elevation: f64,
    pub search_days: f64,
    pub time_step_seconds: f64,
}

impl Default for PassSearch {
    fn default() -> Self {
        Self {
            num_passes: 5,
            min_elevation: 10.0,
            search_days: 3.0,
            time_step_seconds: 30.0,
        }
    }
}

impl SatellitePass {
    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }
}

pub fn calculate_look_angles(
    sat_pos_eci: &Vector3<f64>,
    observer_ecef: &Vector3<f64>,
    gmst: f64,
    observer_lat: f64,
    observer_lon: f64,
) -> LookAngles {
    let sat_ecef = eci_to_ecef(sat_pos_eci, gmst);

    // Range vector from observer to satellite
    let range_vec = sat_ecef - observer_ecef;
    let range_km = range_vec.norm() / 1000.0;

    // Topocentric (SEZ) components
    let lat_rad = observer_lat.to_radians();
    let lon_rad = observer_lon.to_radians();

    let south = range_vec.x * lat_rad.sin() * lon_rad.cos()
        + range_vec.y * lat_rad.sin() * lon_rad.sin()
        - range_vec.z * lat_rad.cos();

    let east = -range_vec.x * lon_rad.sin() + range_vec.y * lon_rad.cos();

    let zenith = range_vec.x * lat_rad.cos() * lon_rad.cos()
        + range_vec.y * lat_rad.cos() * lon_rad.sin()
        + range_vec.z * lat_rad.sin();

    let azimuth = east.atan2(-south).to_degrees();
    let azimuth = if azimuth < 0.0 {
        azimuth + 360.0
    } else {
        azimuth
    };

    let elevation = (zenith / (range_km * 1000.0)).clamp(-1.0, 1.0).asin().to_degrees();

    LookAngles {
        azimuth,
        elevation,
        range: range_km,
    }
}

fn eci_to_ecef(eci: &Vector3<f64>, gmst: f64) -> Vector3<f64> {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();

    Vector3::new(
        eci.x * cos_gmst + eci.y * sin_gmst,
        -eci.x * sin_gmst + eci.y * cos_gmst,
        eci.z,
    )
}

/// Classify a pass by the observer's local mean hour at acquisition.
pub fn classify_pass(aos_time: DateTime<Utc>, observer_lon: f64) -> PassType {
    let local = aos_time + SunTimes::mean_solar_offset(observer_lon);
    PassType::from_local_hour(local.hour())
}

/// Step through the search window and collect passes above `min_elevation`.
/// A pass still in progress when the window closes is dropped.
pub fn predict_passes(
    satellite: &Satellite,
    observer: &ObserverLocation,
    start_time: DateTime<Utc>,
    search: &PassSearch,
) -> SkyResult<Vec<SatellitePass>> {
    let tle_age_days = satellite.tle_age_days(start_time);
    if tle_age_days > EXPIRED_TLE_DAYS {
        return Err(SkyError::Tle(format!(
            "TLE data is too old ({} days). Please download fresh TLE data from https://celestrak.org",
            tle_age_days
        )));
    }
    if tle_age_days > STALE_TLE_DAYS {
        warn!(
            "TLE data for {} is {} days old. Predictions may be inaccurate.",
            satellite.name, tle_age_days
        );
    }

    let mut passes = Vec::new();
    let end_time = start_time + Duration::seconds((search.search_days * 86400.0) as i64);
    let time_step = Duration::milliseconds((search.time_step_seconds.max(1.0) * 1000.0) as i64);
    let observer_ecef = observer.to_ecef();

    let mut in_pass = false;
    let mut pass_start = start_time;
    let mut max_elevation = 0.0;
    let mut max_elevation_time = start_time;
    let mut aos_azimuth = 0.0;
    let mut max_azimuth = 0.0;
    let mut max_range = 0.0;

    let mut current_time = start_time;
    while current_time < end_time && passes.len() < search.num_passes {
        let (sat_pos_km, _) = satellite.propagate(current_time)?;

        let look_angles = calculate_look_angles(
            &(sat_pos_km * 1000.0),
            &observer_ecef,
            calculate_gmst(current_time),
            observer.latitude,
            observer.longitude,
        );

        if look_angles.elevation >= search.min_elevation {
            if !in_pass {
                in_pass = true;
                pass_start = current_time;
                aos_azimuth = look_angles.azimuth;
                max_elevation = look_angles.elevation;
                max_elevation_time = current_time;
                max_azimuth = look_angles.azimuth;
                max_range = look_angles.range;
            } else if look_angles.elevation > max_elevation {
                max_elevation = look_angles.elevation;
                max_elevation_time = current_time;
                max_azimuth = look_angles.azimuth;
                max_range = look_angles.range;
            }
        } else if in_pass {
            let duration_seconds = (current_time - pass_start).num_seconds() as f64;
            passes.push(SatellitePass {
                aos_time: pass_start,
                los_time: current_time,
                max_elevation,
                max_elevation_time,
                aos_azimuth,
                max_azimuth,
                los_azimuth: look_angles.azimuth,
                duration_seconds,
                max_range_km: max_range,
                pass_type: classify_pass(pass_start, observer.longitude),
                magnitude: magnitude_from_pass_duration(duration_seconds),
            });
            in_pass = false;
        }

        current_time = current_time + time_step;
    }

    Ok(passes)
}

/// First pass whose acquisition is after `now`.
pub fn next_pass(passes: &[SatellitePass], now: DateTime<Utc>) -> Option<&SatellitePass> {
    passes.iter().find(|pass| pass.aos_time > now)
}

/// Retry interval when a search found no passes at all.
const EMPTY_SEARCH_RETRY_HOURS: i64 = 1;

/// When a pass list made at `searched_at` should be recomputed: once its last
/// pass has ended, or an hour later if it is empty.
pub fn passes_valid_until(passes: &[SatellitePass], searched_at: DateTime<Utc>) -> DateTime<Utc> {
    passes.last().map_or(
        searched_at + Duration::hours(EMPTY_SEARCH_RETRY_HOURS),
        |pass| pass.los_time,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::tests::iss;
    use chrono::TimeZone;

    fn paris() -> ObserverLocation {
        ObserverLocation::new("Paris", 48.8566, 2.3522, 35.0).unwrap()
    }

    #[test]
    fn test_finds_iss_passes_over_paris() {
        let sat = iss();
        let search = PassSearch {
            num_passes: 4,
            search_days: 1.0,
            ..PassSearch::default()
        };
        let passes = predict_passes(&sat, &paris(), sat.epoch, &search).unwrap();

        assert!(!passes.is_empty());
        assert!(passes.len() <= 4);
        for pass in &passes {
            assert!(pass.los_time > pass.aos_time);
            assert!(pass.max_elevation >= search.min_elevation);
            assert!(pass.max_elevation_time >= pass.aos_time);
            assert!(pass.max_elevation_time < pass.los_time);
            assert!(pass.duration_minutes() < 15.0);
            assert!(pass.max_range_km < 2000.0);
        }
        assert!(passes.windows(2).all(|w| w[0].los_time <= w[1].aos_time));
    }

    #[test]
    fn test_refuses_expired_elements() {
        let sat = iss();
        let later = sat.epoch + Duration::days(120);
        assert!(matches!(
            predict_passes(&sat, &paris(), later, &PassSearch::default()),
            Err(SkyError::Tle(_))
        ));
    }

    #[test]
    fn test_classify_pass_uses_observer_longitude() {
        let aos = Utc.with_ymd_and_hms(2024, 6, 21, 2, 0, 0).unwrap();
        // 02:00 UTC is 02:00 at Greenwich, ~20:00 mean time in Austin
        assert_eq!(classify_pass(aos, 0.0), PassType::Night);
        assert_eq!(classify_pass(aos, -97.7431), PassType::Dusk);
    }

    #[test]
    fn test_next_pass() {
        let sat = iss();
        let passes =
            predict_passes(&sat, &paris(), sat.epoch, &PassSearch::default()).unwrap();
        let first = passes.first().unwrap();
        let before = first.aos_time - Duration::seconds(1);
        assert_eq!(next_pass(&passes, before).map(|p| p.aos_time), Some(first.aos_time));
        let last = passes.last().unwrap();
        assert!(next_pass(&passes, last.aos_time).is_none());
    }

    #[test]
    fn test_passes_expire_after_last_pass() {
        let sat = iss();
        let passes =
            predict_passes(&sat, &paris(), sat.epoch, &PassSearch::default()).unwrap();
        let until = passes_valid_until(&passes, sat.epoch);
        assert_eq!(until, passes.last().unwrap().los_time);
        assert!(next_pass(&passes, until).is_none());

        // a fresh search from that instant finds passes again
        let again = predict_passes(&sat, &paris(), until, &PassSearch::default()).unwrap();
        assert!(next_pass(&again, until).is_some());
    }

    #[test]
    fn test_empty_search_retries_later() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 2, 0, 0).unwrap();
        assert_eq!(passes_valid_until(&[], t), t + Duration::hours(1));
    }
}
