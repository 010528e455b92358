//! Sidereal time and equatorial to horizontal conversion.
//!
//! Low precision: J2000 catalog positions are used as-is (no precession,
//! nutation, aberration or refraction). Good to a fraction of a degree, which
//! is plenty for "is it above 10° tonight".

use chrono::{DateTime, NaiveDate, Utc};

use crate::geometry::normalize_degrees;
use crate::observer::ObserverLocation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub altitude: f64, // degrees
    pub azimuth: f64,  // degrees, 0 = North, 90 = East
}

fn j2000() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// Days (fractional) since 2000-01-01 12:00 UTC.
pub fn days_since_j2000(time: DateTime<Utc>) -> f64 {
    time.signed_duration_since(j2000()).num_milliseconds() as f64 / 86_400_000.0
}

/// Greenwich mean sidereal time in radians.
pub fn calculate_gmst(time: DateTime<Utc>) -> f64 {
    let gmst_hours = 18.697374558 + 24.06570982441908 * days_since_j2000(time);
    let gmst_hours = gmst_hours.rem_euclid(24.0);

    (gmst_hours * 15.0).to_radians()
}

/// Local sidereal time in degrees, [0, 360).
pub fn local_sidereal_degrees(time: DateTime<Utc>, longitude: f64) -> f64 {
    normalize_degrees(calculate_gmst(time).to_degrees() + longitude)
}

/// Altitude/azimuth of a fixed equatorial position for an observer at `time`.
pub fn equatorial_to_horizontal(
    ra_hours: f64,
    dec_degrees: f64,
    observer: &ObserverLocation,
    time: DateTime<Utc>,
) -> Horizontal {
    let hour_angle =
        (local_sidereal_degrees(time, observer.longitude) - ra_hours * 15.0).to_radians();
    let lat = observer.latitude.to_radians();
    let dec = dec_degrees.to_radians();

    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin().to_degrees();

    // atan2 gives azimuth from South; shift to North-based
    let azimuth = hour_angle
        .sin()
        .atan2(hour_angle.cos() * lat.sin() - dec.tan() * lat.cos())
        .to_degrees();

    Horizontal {
        altitude,
        azimuth: normalize_degrees(azimuth + 180.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_gmst_at_j2000() {
        let gmst = calculate_gmst(Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap());
        assert!((gmst.to_degrees() - 280.46).abs() < 0.01);
    }

    #[test]
    fn test_star_on_meridian_culminates() {
        let observer = ObserverLocation::new("equator", 0.0, 0.0, 0.0).unwrap();
        let time = Utc.with_ymd_and_hms(2024, 6, 21, 6, 0, 0).unwrap();
        let ra_hours = local_sidereal_degrees(time, 0.0) / 15.0;

        let pos = equatorial_to_horizontal(ra_hours, 0.0, &observer, time);
        assert!((pos.altitude - 90.0).abs() < 1e-6);

        let north = equatorial_to_horizontal(ra_hours, 30.0, &observer, time);
        assert!((north.altitude - 60.0).abs() < 1e-6);
        assert!(north.azimuth < 1e-6 || north.azimuth > 360.0 - 1e-6);

        let south = equatorial_to_horizontal(ra_hours, -30.0, &observer, time);
        assert!((south.azimuth - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_pole_star_altitude_matches_latitude() {
        let observer = ObserverLocation::new("austin", 30.2672, -97.7431, 0.0).unwrap();
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        let pos = equatorial_to_horizontal(0.0, 90.0, &observer, time);
        assert!((pos.altitude - 30.2672).abs() < 1e-6);
    }

    #[test]
    fn test_vega_over_austin() {
        let observer = ObserverLocation::new("austin", 30.2672, -97.7431, 0.0).unwrap();
        let time = Utc.with_ymd_and_hms(2024, 6, 21, 6, 0, 0).unwrap();
        let pos = equatorial_to_horizontal(18.6156, 38.7837, &observer, time);
        assert!((pos.altitude - 73.6).abs() < 0.5);
        assert!((pos.azimuth - 54.1).abs() < 0.5);
    }
}
