//! Everything the dashboard shows for one place at one instant.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::catalog::REFERENCE_STARS;
use crate::constellations::{visible_tonight, NightSummary, VisibilityRecord};
use crate::error::SkyResult;
use crate::iss::{estimate_visibility, SatelliteVisibility, SubPoint};
use crate::moon::MoonPhaseResult;
use crate::observer::ObserverLocation;
use crate::planets::{visible_planets, Planet};
use crate::showers::{active_showers, MeteorShower};
use crate::solar::{Almanac, NightWindow, SunTimes};

#[derive(Debug, Clone)]
pub struct NightSkyReport {
    pub observer: ObserverLocation,
    pub generated_at: DateTime<Utc>,
    /// Calendar date at the observer, by mean solar time.
    pub local_date: NaiveDate,
    pub sun: SunTimes,
    pub night: NightWindow,
    pub moon: MoonPhaseResult,
    pub constellations: Vec<VisibilityRecord>,
    pub summary: NightSummary,
    pub planets: Vec<Planet>,
    pub showers: Vec<MeteorShower>,
    pub iss: SkyResult<SatelliteVisibility>,
}

impl NightSkyReport {
    pub fn build(
        observer: &ObserverLocation,
        now: DateTime<Utc>,
        almanac: &dyn Almanac,
        iss_sub_point: Option<SubPoint>,
    ) -> SkyResult<Self> {
        let local_date = (now + SunTimes::mean_solar_offset(observer.longitude)).date_naive();
        let sun = SunTimes::approximate(observer.latitude, observer.longitude, local_date);

        let night = almanac.night_window(observer, now)?;
        let constellations = visible_tonight(observer, &night, now, &REFERENCE_STARS)?;
        let summary = NightSummary::from_records(&night, &constellations);

        Ok(NightSkyReport {
            observer: observer.clone(),
            generated_at: now,
            local_date,
            sun,
            night,
            moon: MoonPhaseResult::at(now),
            constellations,
            summary,
            planets: visible_planets(local_date.month(), observer.latitude),
            showers: active_showers(local_date.month()),
            iss: estimate_visibility(observer, iss_sub_point),
        })
    }

    pub fn is_night(&self) -> bool {
        self.night.contains(self.generated_at)
    }
}
