//! Moon phase from elapsed synodic months.
//!
//! Location independent: the tiny parallax effect on phase is ignored.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Mean length of a lunation in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530588;

/// Half a lunation; new moon to full moon.
const HALF_SYNODIC_MONTH_DAYS: f64 = 14.765;

/// Upper (exclusive) age bound of each phase bin, in days.
const PHASE_BOUNDARIES: [(f64, MoonPhase); 8] = [
    (1.85, MoonPhase::NewMoon),
    (5.54, MoonPhase::WaxingCrescent),
    (9.23, MoonPhase::FirstQuarter),
    (12.91, MoonPhase::WaxingGibbous),
    (16.60, MoonPhase::FullMoon),
    (20.29, MoonPhase::WaningGibbous),
    (23.98, MoonPhase::LastQuarter),
    (27.66, MoonPhase::WaningCrescent),
];

/// Reference new moon: 2024-01-11 11:57 UTC.
pub fn reference_new_moon() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2024, 1, 11)
        .and_then(|d| d.and_hms_opt(11, 57, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// Classify a phase age in days. Ages past the last boundary wrap to new.
    pub fn from_age(age_days: f64) -> Self {
        PHASE_BOUNDARIES
            .iter()
            .find(|(upper, _)| age_days < *upper)
            .map(|(_, phase)| *phase)
            .unwrap_or(MoonPhase::NewMoon)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoonPhaseResult {
    pub phase: MoonPhase,
    pub illumination_percent: f64,
    pub age_days: f64,
    pub phase_angle_degrees: f64,
    pub next_new_moon: DateTime<Utc>,
    pub next_full_moon: DateTime<Utc>,
}

fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * 86_400_000.0).round() as i64)
}

/// Illumined fraction of the disc, in percent, for a phase age.
pub fn illumination_percent(age_days: f64) -> f64 {
    let angle = 2.0 * std::f64::consts::PI * age_days / SYNODIC_MONTH_DAYS;
    (1.0 - angle.cos()) / 2.0 * 100.0
}

impl MoonPhaseResult {
    pub fn at(time: DateTime<Utc>) -> Self {
        let epoch = reference_new_moon();
        let days_since =
            time.signed_duration_since(epoch).num_milliseconds() as f64 / 86_400_000.0;

        let lunations = (days_since / SYNODIC_MONTH_DAYS).floor();
        let age_days = days_since.rem_euclid(SYNODIC_MONTH_DAYS);

        let last_new_moon_days = lunations * SYNODIC_MONTH_DAYS;
        let next_new_moon = epoch + days_to_duration(last_new_moon_days + SYNODIC_MONTH_DAYS);

        let mut next_full_moon = epoch + days_to_duration(last_new_moon_days + HALF_SYNODIC_MONTH_DAYS);
        if next_full_moon <= time {
            next_full_moon = next_full_moon + days_to_duration(SYNODIC_MONTH_DAYS);
        }

        MoonPhaseResult {
            phase: MoonPhase::from_age(age_days),
            illumination_percent: illumination_percent(age_days),
            age_days,
            phase_angle_degrees: age_days / SYNODIC_MONTH_DAYS * 360.0,
            next_new_moon,
            next_full_moon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_phase_bins() {
        assert_eq!(MoonPhase::from_age(0.0), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::from_age(1.85), MoonPhase::WaxingCrescent);
        assert_eq!(MoonPhase::from_age(9.0), MoonPhase::FirstQuarter);
        assert_eq!(MoonPhase::from_age(14.8), MoonPhase::FullMoon);
        assert_eq!(MoonPhase::from_age(16.60), MoonPhase::WaningGibbous);
        assert_eq!(MoonPhase::from_age(23.0), MoonPhase::LastQuarter);
        assert_eq!(MoonPhase::from_age(27.0), MoonPhase::WaningCrescent);
        assert_eq!(MoonPhase::from_age(27.66), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::from_age(29.5), MoonPhase::NewMoon);
    }

    #[test]
    fn test_illumination_extremes() {
        assert!(illumination_percent(0.0).abs() < 1e-9);
        assert!((illumination_percent(14.8) - 100.0).abs() < 1.0);
        assert!((illumination_percent(SYNODIC_MONTH_DAYS / 4.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_reference_epoch_is_new_moon() {
        let result = MoonPhaseResult::at(reference_new_moon());
        assert_eq!(result.phase, MoonPhase::NewMoon);
        assert!(result.age_days.abs() < 1e-9);
        assert!(result.illumination_percent < 1e-6);
    }

    #[test]
    fn test_full_moon_date() {
        // Full moon of 2024-01-25 17:54 UTC
        let result = MoonPhaseResult::at(Utc.with_ymd_and_hms(2024, 1, 25, 17, 54, 0).unwrap());
        assert_eq!(result.phase, MoonPhase::FullMoon);
        assert!(result.illumination_percent > 98.0);
        assert_eq!(result.phase.as_str(), "Full Moon");
    }

    #[test]
    fn test_phase_is_periodic() {
        let lunation = days_to_duration(SYNODIC_MONTH_DAYS);
        let mut t = Utc.with_ymd_and_hms(2019, 3, 2, 4, 30, 0).unwrap();
        for _ in 0..40 {
            let a = MoonPhaseResult::at(t);
            let b = MoonPhaseResult::at(t + lunation);
            assert!((a.age_days - b.age_days).abs() < 1e-4, "{} vs {}", a.age_days, b.age_days);
            assert!((a.illumination_percent - b.illumination_percent).abs() < 1e-3);
            t = t + Duration::hours(19);
        }
    }

    #[test]
    fn test_before_epoch_has_positive_age() {
        let result = MoonPhaseResult::at(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
        assert!(result.age_days >= 0.0 && result.age_days < SYNODIC_MONTH_DAYS);
    }

    #[test]
    fn test_next_events_are_in_the_future() {
        let t = Utc.with_ymd_and_hms(2024, 1, 28, 0, 0, 0).unwrap();
        let result = MoonPhaseResult::at(t);
        assert!(result.next_new_moon > t);
        assert!(result.next_full_moon > t);
        assert!(result.next_new_moon - t <= days_to_duration(SYNODIC_MONTH_DAYS));
        assert!(result.next_full_moon - t <= days_to_duration(SYNODIC_MONTH_DAYS));
    }
}
