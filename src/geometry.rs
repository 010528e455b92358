//! Spherical-earth helpers shared by the sky and satellite calculations.

/// Mean Earth radius used by the haversine distance (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers (haversine).
pub fn great_circle_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Approximate angle above the horizon of an object `object_altitude_km`
/// above a ground point `distance_km` away. Clamped to [0, 90].
pub fn elevation_from_distance(distance_km: f64, object_altitude_km: f64) -> f64 {
    if distance_km <= 0.0 {
        return 90.0; // directly overhead
    }

    let angle = (object_altitude_km / distance_km).atan().to_degrees();
    angle.clamp(0.0, 90.0)
}

/// Forward azimuth from point 1 to point 2, in [0, 360).
pub fn bearing_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    normalize_degrees(x.atan2(y).to_degrees())
}

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassOctant {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassOctant {
    /// 45° sectors centered on each direction; lower edges are inclusive.
    pub fn from_azimuth(azimuth: f64) -> Self {
        let az = normalize_degrees(azimuth);
        match az {
            a if a >= 337.5 || a < 22.5 => CompassOctant::N,
            a if a < 67.5 => CompassOctant::NE,
            a if a < 112.5 => CompassOctant::E,
            a if a < 157.5 => CompassOctant::SE,
            a if a < 202.5 => CompassOctant::S,
            a if a < 247.5 => CompassOctant::SW,
            a if a < 292.5 => CompassOctant::W,
            _ => CompassOctant::NW,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassOctant::N => "N",
            CompassOctant::NE => "NE",
            CompassOctant::E => "E",
            CompassOctant::SE => "SE",
            CompassOctant::S => "S",
            CompassOctant::SW => "SW",
            CompassOctant::W => "W",
            CompassOctant::NW => "NW",
        }
    }
}
