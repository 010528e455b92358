//! Sunrise, sunset and twilight estimates.
//!
//! This is a deliberately coarse, day-of-year approximation: equation of time
//! and declination from the usual low-precision series, no refraction, no
//! observer height. Expect errors of several minutes (tens of minutes near the
//! polar circles). All instants are UTC; the longitude enters only through the
//! linear `lon / 15` hour offset of solar noon.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use log::debug;

use crate::error::{SkyError, SkyResult};
use crate::observer::ObserverLocation;

/// Hour angle used when the sun never crosses the horizon (polar day/night).
pub const FALLBACK_HOUR_ANGLE_DEG: f64 = 90.0;

/// A begin/end pair around sunrise and sunset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwilightBand {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SunTimes {
    pub date: NaiveDate,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub civil: TwilightBand,
    pub nautical: TwilightBand,
    pub astronomical: TwilightBand,
    pub day_length_hours: f64,
    /// Sunrise hour angle in degrees.
    pub hour_angle: f64,
    /// True when the horizon-crossing formula had no solution and the fixed
    /// 90° hour angle was substituted.
    pub hour_angle_fallback: bool,
}

/// Equation of time in minutes for a day of the year.
pub fn equation_of_time_minutes(day_of_year: u32) -> f64 {
    let b = 2.0 * std::f64::consts::PI * (day_of_year as f64 - 81.0) / 365.0;
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Solar declination in degrees for a day of the year.
pub fn solar_declination(day_of_year: u32) -> f64 {
    23.45 * (360.0 * (284.0 + day_of_year as f64) / 365.0).to_radians().sin()
}

/// Sunrise hour angle in degrees. `None` when the sun stays above or below
/// the horizon all day.
pub fn sunrise_hour_angle(latitude: f64, declination: f64) -> Option<f64> {
    let arg = -latitude.to_radians().tan() * declination.to_radians().tan();
    if (-1.0..=1.0).contains(&arg) {
        Some(arg.acos().to_degrees())
    } else {
        None
    }
}

fn at_utc_hour(date: NaiveDate, hours: f64) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
    midnight + Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

impl SunTimes {
    pub fn approximate(latitude: f64, longitude: f64, date: NaiveDate) -> Self {
        let day_of_year = date.ordinal();
        let eot = equation_of_time_minutes(day_of_year);
        let declination = solar_declination(day_of_year);

        let (hour_angle, hour_angle_fallback) = match sunrise_hour_angle(latitude, declination) {
            Some(h) => (h, false),
            None => {
                debug!(
                    "no horizon crossing at lat {:.2} on {} (decl {:.2}), using {}° hour angle",
                    latitude, date, declination, FALLBACK_HOUR_ANGLE_DEG
                );
                (FALLBACK_HOUR_ANGLE_DEG, true)
            }
        };

        let noon_hour = 12.0 - eot / 60.0 - longitude / 15.0;
        let sunrise = at_utc_hour(date, noon_hour - hour_angle / 15.0);
        let sunset = at_utc_hour(date, noon_hour + hour_angle / 15.0);

        let band = |minutes: i64| TwilightBand {
            begin: sunrise - Duration::minutes(minutes),
            end: sunset + Duration::minutes(minutes),
        };

        SunTimes {
            date,
            sunrise,
            sunset,
            civil: band(30),
            nautical: band(60),
            astronomical: band(90),
            day_length_hours: hour_angle * 2.0 / 15.0,
            hour_angle,
            hour_angle_fallback,
        }
    }

    /// Local mean solar time offset for display (longitude / 15 hours).
    pub fn mean_solar_offset(longitude: f64) -> Duration {
        Duration::seconds((longitude * 240.0).round() as i64)
    }
}

/// The dark interval `[sunset, sunrise)` a constellation scan samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NightWindow {
    pub sunset: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
}

impl NightWindow {
    pub fn new(sunset: DateTime<Utc>, sunrise: DateTime<Utc>) -> SkyResult<Self> {
        if sunrise <= sunset {
            return Err(SkyError::InvalidWindow { sunset, sunrise });
        }
        Ok(Self { sunset, sunrise })
    }

    /// Night starting at the sunset of `date` and ending at the next sunrise.
    pub fn following(latitude: f64, longitude: f64, date: NaiveDate) -> SkyResult<Self> {
        let evening = SunTimes::approximate(latitude, longitude, date);
        let next_date = date.succ_opt().unwrap_or(date);
        let morning = SunTimes::approximate(latitude, longitude, next_date);
        Self::new(evening.sunset, morning.sunrise)
    }

    /// The night in progress at `now`, or the next one if it is daytime.
    pub fn current_or_next(
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
    ) -> SkyResult<Self> {
        let today = now.date_naive();
        let mut last_err = None;

        for offset in -1..=1 {
            let date = today + Duration::days(offset);
            match Self::following(latitude, longitude, date) {
                Ok(window) if window.sunrise > now => return Ok(window),
                Ok(_) => {}
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            let sun = SunTimes::approximate(latitude, longitude, today);
            SkyError::InvalidWindow {
                sunset: sun.sunset,
                sunrise: sun.sunrise,
            }
        }))
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.sunset && time < self.sunrise
    }

    pub fn duration(&self) -> Duration {
        self.sunrise - self.sunset
    }
}

/// Source of tonight's sunset/sunrise. A precise ephemeris can stand in for
/// the built-in approximation.
pub trait Almanac {
    fn night_window(&self, observer: &ObserverLocation, now: DateTime<Utc>)
        -> SkyResult<NightWindow>;
}

/// Almanac backed by [`SunTimes::approximate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateAlmanac;

impl Almanac for ApproximateAlmanac {
    fn night_window(
        &self,
        observer: &ObserverLocation,
        now: DateTime<Utc>,
    ) -> SkyResult<NightWindow> {
        NightWindow::current_or_next(observer.latitude, observer.longitude, now)
    }
}

/// Almanac that always answers with a window supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct FixedAlmanac(pub NightWindow);

impl Almanac for FixedAlmanac {
    fn night_window(&self, _: &ObserverLocation, _: DateTime<Utc>) -> SkyResult<NightWindow> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_twilight_bands_are_fixed_offsets() {
        let sun = SunTimes::approximate(30.2672, -97.7431, date(2024, 3, 15));
        assert_eq!(sun.sunrise - sun.civil.begin, Duration::minutes(30));
        assert_eq!(sun.nautical.end - sun.sunset, Duration::minutes(60));
        assert_eq!(sun.sunrise - sun.astronomical.begin, Duration::minutes(90));
        assert!(!sun.hour_angle_fallback);
    }

    #[test]
    fn test_equator_has_twelve_hour_day() {
        let sun = SunTimes::approximate(0.0, 0.0, date(2024, 9, 22));
        assert!((sun.day_length_hours - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_polar_day_uses_fallback_hour_angle() {
        let sun = SunTimes::approximate(78.0, 15.0, date(2024, 6, 21));
        assert!(sun.hour_angle_fallback);
        assert_eq!(sun.hour_angle, FALLBACK_HOUR_ANGLE_DEG);
        assert!((sun.day_length_hours - 12.0).abs() < 1e-9);
        assert!(sun.sunset > sun.sunrise);
    }

    #[test]
    fn test_declination_extremes() {
        // around the solstices
        assert!((solar_declination(172) - 23.45).abs() < 0.1);
        assert!((solar_declination(355) + 23.45).abs() < 0.1);
    }

    #[test]
    fn test_night_window_rejects_inverted_interval() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 2, 0, 0).unwrap();
        assert!(matches!(
            NightWindow::new(t, t),
            Err(SkyError::InvalidWindow { .. })
        ));
        assert!(NightWindow::new(t, t - Duration::hours(1)).is_err());
        assert!(NightWindow::new(t, t + Duration::hours(8)).is_ok());
    }

    #[test]
    fn test_current_or_next_contains_night_time() {
        // 03:00 local (CDT) in Austin
        let now = Utc.with_ymd_and_hms(2024, 6, 21, 8, 0, 0).unwrap();
        let window = NightWindow::current_or_next(30.2672, -97.7431, now).unwrap();
        assert!(window.contains(now));
    }

    #[test]
    fn test_current_or_next_in_daytime_is_upcoming() {
        // noon local (CDT) in Austin
        let now = Utc.with_ymd_and_hms(2024, 6, 20, 17, 0, 0).unwrap();
        let window = NightWindow::current_or_next(30.2672, -97.7431, now).unwrap();
        assert!(window.sunset > now);
        assert!(window.duration() < Duration::hours(12));
    }

    #[test]
    fn test_fixed_almanac_is_interchangeable() {
        let observer = ObserverLocation::new("austin", 30.2672, -97.7431, 0.0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 20, 17, 0, 0).unwrap();
        let approx = ApproximateAlmanac.night_window(&observer, now).unwrap();
        let fixed = FixedAlmanac(approx).night_window(&observer, now).unwrap();
        assert_eq!(approx, fixed);
    }
}
