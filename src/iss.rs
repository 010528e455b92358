//! Naked-eye visibility of the ISS from its ground sub-point.
//!
//! Flat heuristics: the elevation is `atan(altitude / ground distance)` and the
//! brightness and quality ratings are fixed distance and elevation bands.

use chrono::{DateTime, Timelike, Utc};

use crate::error::{SkyError, SkyResult};
use crate::geometry::{bearing_degrees, elevation_from_distance, great_circle_distance_km};
use crate::observer::ObserverLocation;

pub const ISS_ALTITUDE_KM: f64 = 408.0;
pub const ISS_VELOCITY_KMH: f64 = 27_600.0;

/// Ground distance within which the station is considered visible.
pub const VISIBILITY_RADIUS_KM: f64 = 2200.0;

/// Point on the ground directly beneath the satellite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VisibilityQuality {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl VisibilityQuality {
    pub fn from_elevation(elevation: f64) -> Self {
        if elevation > 60.0 {
            VisibilityQuality::Excellent
        } else if elevation > 40.0 {
            VisibilityQuality::VeryGood
        } else if elevation > 25.0 {
            VisibilityQuality::Good
        } else if elevation > 10.0 {
            VisibilityQuality::Fair
        } else {
            VisibilityQuality::Poor
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VisibilityQuality::Excellent => "Excellent",
            VisibilityQuality::VeryGood => "Very good",
            VisibilityQuality::Good => "Good",
            VisibilityQuality::Fair => "Fair",
            VisibilityQuality::Poor => "Poor",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            VisibilityQuality::Excellent => "Nearly overhead",
            VisibilityQuality::VeryGood => "High in sky",
            VisibilityQuality::Good => "Clearly visible",
            VisibilityQuality::Fair => "Low but visible",
            VisibilityQuality::Poor => "Very low on horizon",
        }
    }
}

pub fn within_visibility_radius(distance_km: f64) -> bool {
    distance_km <= VISIBILITY_RADIUS_KM
}

/// Apparent magnitude from ground distance.
pub fn magnitude_from_distance(distance_km: f64) -> f64 {
    if distance_km < 500.0 {
        -3.5
    } else if distance_km < 1000.0 {
        -2.5
    } else if distance_km < 1500.0 {
        -1.5
    } else {
        -0.5
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteVisibility {
    pub sub_point: SubPoint,
    pub distance_km: f64,
    pub elevation_degrees: f64,
    pub azimuth_degrees: f64,
    pub magnitude: f64,
    pub quality: VisibilityQuality,
    pub visible: bool,
}

/// Estimate how the satellite looks from `observer`. A missing sub-point is
/// reported as [`SkyError::PositionUnavailable`], never guessed.
pub fn estimate_visibility(
    observer: &ObserverLocation,
    sub_point: Option<SubPoint>,
) -> SkyResult<SatelliteVisibility> {
    let sub_point = sub_point.ok_or(SkyError::PositionUnavailable)?;
    Ok(visibility_from_sub_point(observer, sub_point))
}

pub fn visibility_from_sub_point(
    observer: &ObserverLocation,
    sub_point: SubPoint,
) -> SatelliteVisibility {
    let distance_km = great_circle_distance_km(
        observer.latitude,
        observer.longitude,
        sub_point.latitude,
        sub_point.longitude,
    );
    let elevation_degrees = elevation_from_distance(distance_km, ISS_ALTITUDE_KM);

    SatelliteVisibility {
        sub_point,
        distance_km,
        elevation_degrees,
        azimuth_degrees: bearing_degrees(
            observer.latitude,
            observer.longitude,
            sub_point.latitude,
            sub_point.longitude,
        ),
        magnitude: magnitude_from_distance(distance_km),
        quality: VisibilityQuality::from_elevation(elevation_degrees),
        visible: within_visibility_radius(distance_km),
    }
}

/// Rough region the sub-point lies over.
pub fn describe_location(lat: f64, lon: f64) -> &'static str {
    #[derive(Clone, Copy)]
    enum Sector {
        EuropeAfrica,
        Asia,
        Americas,
        Pacific,
    }

    let sector = if (-30.0..=60.0).contains(&lon) {
        Sector::EuropeAfrica
    } else if (60.0..=150.0).contains(&lon) {
        Sector::Asia
    } else if (-150.0..=-30.0).contains(&lon) {
        Sector::Americas
    } else {
        Sector::Pacific
    };

    if (-30.0..=30.0).contains(&lat) {
        match sector {
            Sector::EuropeAfrica => "Over Africa or Middle East",
            Sector::Asia => "Over Asia or Australia",
            Sector::Americas => "Over the Americas",
            Sector::Pacific => "Over the Pacific Ocean",
        }
    } else if lat > 30.0 {
        match sector {
            Sector::EuropeAfrica => "Over Europe or North Africa",
            Sector::Asia => "Over Northern Asia",
            Sector::Americas => "Over North America",
            Sector::Pacific => "Over the North Pacific",
        }
    } else {
        match sector {
            Sector::EuropeAfrica => "Over Southern Africa",
            Sector::Asia => "Over Australia or Southern Ocean",
            Sector::Americas => "Over South America",
            Sector::Pacific => "Over the South Pacific",
        }
    }
}

/// Whether it is roughly daytime under the sub-point: local mean hour
/// (UTC hour shifted by whole `lon / 15` hours) between 06 and 18 inclusive.
pub fn is_daylight_below(time: DateTime<Utc>, lon: f64) -> bool {
    let local_hour = (time.hour() as i64 + (lon / 15.0).trunc() as i64).rem_euclid(24);
    (6..=18).contains(&local_hour)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassType {
    Dawn,
    Dusk,
    Night,
    Daylight,
}

impl PassType {
    /// Classify a pass by the local hour it starts in.
    pub fn from_local_hour(hour: u32) -> Self {
        match hour {
            5 | 6 => PassType::Dawn,
            19 | 20 => PassType::Dusk,
            h if h >= 21 || h < 5 => PassType::Night,
            _ => PassType::Daylight,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PassType::Dawn => "Dawn pass",
            PassType::Dusk => "Dusk pass",
            PassType::Night => "Night pass",
            PassType::Daylight => "Daylight pass (not visible)",
        }
    }

    pub fn is_observable(&self) -> bool {
        *self != PassType::Daylight
    }
}

/// Brightness guess from pass duration; longer passes climb higher.
pub fn magnitude_from_pass_duration(duration_seconds: f64) -> f64 {
    if duration_seconds > 360.0 {
        -3.5
    } else if duration_seconds > 240.0 {
        -2.5
    } else if duration_seconds > 120.0 {
        -1.5
    } else {
        -0.5
    }
}
