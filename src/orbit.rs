//! Local orbital source: TLE parsing and SGP4 propagation.
//!
//! Stands in for the live position feed when a fresh element set is on hand.

use chrono::{DateTime, Utc};
use log::warn;
use nalgebra::Vector3;
use sgp4::{Constants, Elements, MinutesSinceEpoch};

use crate::coords::calculate_gmst;
use crate::error::{SkyError, SkyResult};
use crate::iss::SubPoint;
use crate::observer::ObserverLocation;
use crate::passes::calculate_look_angles;

#[derive(Clone)]
pub struct Satellite {
    pub name: String,
    pub elements: Elements,
    pub epoch: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SatellitePosition {
    pub name: String,
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_km: f64,
    pub velocity_km_s: f64,
    pub azimuth: f64,
    pub elevation: f64,
    pub range_km: f64,
    pub above_horizon: bool,
}

impl SatellitePosition {
    pub fn sub_point(&self) -> SubPoint {
        SubPoint {
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: self.time,
        }
    }
}

impl Satellite {
    pub fn from_tle(name: Option<&str>, line1: &str, line2: &str) -> SkyResult<Self> {
        let elements = Elements::from_tle(
            name.map(|n| n.trim().to_string()),
            line1.trim().as_bytes(),
            line2.trim().as_bytes(),
        )
        .map_err(|e| SkyError::Tle(e.to_string()))?;

        let name = elements
            .object_name
            .clone()
            .unwrap_or_else(|| elements.international_designator.clone().unwrap_or_default());
        let epoch = elements.datetime.and_utc();

        Ok(Self {
            name,
            elements,
            epoch,
        })
    }

    pub fn tle_age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.epoch).num_days().abs()
    }

    pub fn minutes_since_epoch(&self, time: DateTime<Utc>) -> f64 {
        time.signed_duration_since(self.epoch).num_milliseconds() as f64 / 60000.0
    }

    /// Propagated ECI (TEME) position in km and speed in km/s.
    pub fn propagate(&self, time: DateTime<Utc>) -> SkyResult<(Vector3<f64>, f64)> {
        let constants = Constants::from_elements(&self.elements)
            .map_err(|e| SkyError::Propagation(e.to_string()))?;
        let prediction = constants
            .propagate(MinutesSinceEpoch(self.minutes_since_epoch(time)))
            .map_err(|e| SkyError::Propagation(e.to_string()))?;

        let position = Vector3::new(
            prediction.position[0],
            prediction.position[1],
            prediction.position[2],
        );
        let velocity = Vector3::new(
            prediction.velocity[0],
            prediction.velocity[1],
            prediction.velocity[2],
        );

        Ok((position, velocity.norm()))
    }

    pub fn sub_point(&self, time: DateTime<Utc>) -> SkyResult<SubPoint> {
        let (eci_km, _) = self.propagate(time)?;
        let (latitude, longitude, _) = eci_to_geodetic(&eci_km, calculate_gmst(time));
        Ok(SubPoint {
            latitude,
            longitude,
            timestamp: time,
        })
    }

    pub fn position(
        &self,
        time: DateTime<Utc>,
        observer: &ObserverLocation,
    ) -> SkyResult<SatellitePosition> {
        let (sat_pos_km, velocity_km_s) = self.propagate(time)?;

        let gmst = calculate_gmst(time);
        let look_angles = calculate_look_angles(
            &(sat_pos_km * 1000.0),
            &observer.to_ecef(),
            gmst,
            observer.latitude,
            observer.longitude,
        );

        let (lat, lon, alt_km) = eci_to_geodetic(&sat_pos_km, gmst);

        Ok(SatellitePosition {
            name: self.name.clone(),
            time,
            latitude: lat,
            longitude: lon,
            altitude_km: alt_km,
            velocity_km_s,
            azimuth: look_angles.azimuth,
            elevation: look_angles.elevation,
            range_km: look_angles.range,
            above_horizon: look_angles.elevation > 0.0,
        })
    }
}

/// Parse a three-line TLE file, keeping satellites whose name contains
/// `filter` (all of them when `None`). Malformed entries are skipped.
pub fn parse_tles(tle_data: &str, filter: Option<&str>) -> Vec<Satellite> {
    let lines: Vec<&str> = tle_data.lines().map(|l| l.trim_end()).collect();
    let mut satellites = Vec::new();

    let mut i = 0;
    while i + 2 < lines.len() {
        if !lines[i].is_empty() && lines[i + 1].starts_with('1') && lines[i + 2].starts_with('2')
        {
            let name = lines[i].trim();
            let wanted = filter.map_or(true, |f| name.to_uppercase().contains(&f.to_uppercase()));

            if wanted {
                match Satellite::from_tle(Some(name), lines[i + 1], lines[i + 2]) {
                    Ok(sat) => satellites.push(sat),
                    Err(e) => warn!("skipping TLE for {}: {}", name, e),
                }
            }

            i += 3;
        } else {
            i += 1;
        }
    }

    satellites
}

fn eci_to_geodetic(eci: &Vector3<f64>, gmst: f64) -> (f64, f64, f64) {
    // Convert ECI to ECEF
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();

    let x = eci.x * cos_gmst + eci.y * sin_gmst;
    let y = -eci.x * sin_gmst + eci.y * cos_gmst;
    let z = eci.z;

    // WGS84 parameters
    const A: f64 = 6378.137; // km
    const F: f64 = 1.0 / 298.257223563;
    const E2: f64 = F * (2.0 - F);

    let lon = y.atan2(x);

    // Iteratively calculate latitude
    let p = (x * x + y * y).sqrt();
    let mut lat = (z / p).atan();

    for _ in 0..5 {
        let sin_lat = lat.sin();
        let n = A / (1.0 - E2 * sin_lat * sin_lat).sqrt();
        let h = p / lat.cos() - n;
        lat = (z / p / (1.0 - E2 * n / (n + h))).atan();
    }

    let sin_lat = lat.sin();
    let n = A / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    let alt = p / lat.cos() - n;

    (lat.to_degrees(), lon.to_degrees(), alt)
}
