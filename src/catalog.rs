//! Reference stars: one bright, easy member per constellation.

use chrono::{DateTime, Utc};

use crate::coords::{equatorial_to_horizontal, Horizontal};
use crate::observer::ObserverLocation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceStar {
    pub constellation: &'static str,
    pub star: &'static str,
    pub ra_hours: f64,    // J2000
    pub dec_degrees: f64, // J2000
    pub description: &'static str,
}

impl ReferenceStar {
    pub fn horizontal(&self, observer: &ObserverLocation, time: DateTime<Utc>) -> Horizontal {
        equatorial_to_horizontal(self.ra_hours, self.dec_degrees, observer, time)
    }
}

const fn star(
    constellation: &'static str,
    star: &'static str,
    ra_hours: f64,
    dec_degrees: f64,
    description: &'static str,
) -> ReferenceStar {
    ReferenceStar {
        constellation,
        star,
        ra_hours,
        dec_degrees,
        description,
    }
}

pub static REFERENCE_STARS: [ReferenceStar; 16] = [
    star("Orion", "Rigel", 5.2423, -8.2017, "The Hunter - look for three stars in a belt"),
    star("Ursa Major", "Dubhe", 11.0621, 61.7508, "Big Dipper - seven bright stars in a ladle shape"),
    star("Leo", "Regulus", 10.1395, 11.9672, "The Lion - backwards question mark forms the head"),
    star("Scorpius", "Antares", 16.4901, -26.4320, "The Scorpion - curved tail with red Antares"),
    star("Cassiopeia", "Schedar", 0.6751, 56.5372, "The Queen - distinctive W or M shape"),
    star("Cygnus", "Deneb", 20.6905, 45.2803, "Northern Cross - flying along the Milky Way"),
    star("Taurus", "Aldebaran", 4.5987, 16.5093, "The Bull - V-shaped face with orange eye"),
    star("Andromeda", "Alpheratz", 0.1398, 29.0906, "The Princess - home to Andromeda Galaxy M31"),
    star("Perseus", "Mirfak", 3.4054, 49.8612, "The Hero - contains variable star Algol"),
    star("Gemini", "Pollux", 7.7553, 28.0262, "The Twins - Castor and Pollux mark their heads"),
    star("Lyra", "Vega", 18.6156, 38.7837, "The Lyre - brilliant Vega in Summer Triangle"),
    star("Boötes", "Arcturus", 14.2610, 19.1825, "The Herdsman - kite shape with orange Arcturus"),
    star("Virgo", "Spica", 13.4199, -11.1614, "The Virgin - bright blue-white Spica"),
    star("Aquila", "Altair", 19.8464, 8.8683, "The Eagle - Altair in Summer Triangle"),
    star("Pegasus", "Markab", 23.0794, 15.2053, "The Winged Horse - Great Square of Pegasus"),
    star("Sagittarius", "Kaus Australis", 18.4029, -34.3847, "The Archer - teapot asterism points to galactic center"),
];

pub fn find(constellation: &str) -> Option<&'static ReferenceStar> {
    REFERENCE_STARS
        .iter()
        .find(|s| s.constellation.eq_ignore_ascii_case(constellation))
}

/// The constellation shown when nothing clears the horizon tonight:
/// Orion in Dec-Feb, Leo in Mar-May, Cygnus in Jun-Aug, Andromeda otherwise.
pub fn seasonal_default(month: u32) -> &'static ReferenceStar {
    let name = match month {
        12 | 1 | 2 => "Orion",
        3..=5 => "Leo",
        6..=8 => "Cygnus",
        _ => "Andromeda",
    };
    // every seasonal name is in the catalog
    find(name).unwrap_or(&REFERENCE_STARS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_one_star_per_constellation() {
        let names: HashSet<_> = REFERENCE_STARS.iter().map(|s| s.constellation).collect();
        assert_eq!(names.len(), REFERENCE_STARS.len());
    }

    #[test]
    fn test_coordinates_in_range() {
        for s in REFERENCE_STARS.iter() {
            assert!((0.0..24.0).contains(&s.ra_hours), "{}", s.star);
            assert!((-90.0..=90.0).contains(&s.dec_degrees), "{}", s.star);
        }
    }

    #[test]
    fn test_seasonal_defaults() {
        assert_eq!(seasonal_default(1).constellation, "Orion");
        assert_eq!(seasonal_default(12).constellation, "Orion");
        assert_eq!(seasonal_default(4).constellation, "Leo");
        assert_eq!(seasonal_default(7).star, "Deneb");
        assert_eq!(seasonal_default(10).constellation, "Andromeda");
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("ursa major").map(|s| s.star), Some("Dubhe"));
        assert!(find("Draco").is_none());
    }
}
