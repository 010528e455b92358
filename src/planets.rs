//! Naked-eye planets by month.
//!
//! A fixed seasonal table, not an ephemeris. The table and the high-latitude
//! truncation are the whole contract.

/// Above this absolute latitude only the first two entries are claimed.
pub const HIGH_LATITUDE_DEG: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planet {
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Planet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
        }
    }

    /// Typical apparent visual magnitude.
    pub fn typical_magnitude(&self) -> f64 {
        match self {
            Planet::Mercury => -0.5,
            Planet::Venus => -4.0,
            Planet::Mars => 0.5,
            Planet::Jupiter => -2.5,
            Planet::Saturn => 0.5,
            Planet::Uranus => 5.7,
            Planet::Neptune => 7.8,
        }
    }
}

use Planet::*;

const MONTHLY_PLANETS: [&[Planet]; 12] = [
    &[Mars, Jupiter],
    &[Venus, Mars, Jupiter],
    &[Venus, Mars, Saturn],
    &[Venus, Mars, Saturn],
    &[Venus, Jupiter, Saturn],
    &[Jupiter, Saturn],
    &[Jupiter, Saturn, Mars],
    &[Jupiter, Saturn, Mars],
    &[Jupiter, Saturn, Venus],
    &[Venus, Jupiter, Saturn],
    &[Venus, Mars, Jupiter],
    &[Venus, Mars, Jupiter],
];

/// Planets nominally visible in `month` (1-12). Out-of-range months give an
/// empty list.
pub fn visible_planets(month: u32, latitude: f64) -> Vec<Planet> {
    let Some(entry) = (month as usize)
        .checked_sub(1)
        .and_then(|idx| MONTHLY_PLANETS.get(idx))
    else {
        return Vec::new();
    };

    let mut planets = entry.to_vec();
    if latitude.abs() > HIGH_LATITUDE_DEG {
        planets.truncate(2);
    }
    planets
}

#[cfg(test)]
mod tests {
    use super::Planet::*;
    use super::*;

    #[test]
    fn test_january_high_latitude_truncates() {
        assert_eq!(visible_planets(1, 65.0), vec![Mars, Jupiter]);
    }

    #[test]
    fn test_january_low_latitude_is_full_entry() {
        assert_eq!(visible_planets(1, 10.0), vec![Mars, Jupiter]);
    }

    #[test]
    fn test_truncation_only_above_sixty() {
        assert_eq!(visible_planets(2, 60.0).len(), 3);
        assert_eq!(visible_planets(2, -60.5), vec![Venus, Mars]);
        assert_eq!(visible_planets(9, 10.0), vec![Jupiter, Saturn, Venus]);
    }

    #[test]
    fn test_every_month_has_two_or_three() {
        for month in 1..=12 {
            let n = visible_planets(month, 0.0).len();
            assert!((2..=3).contains(&n), "month {month}");
        }
    }

    #[test]
    fn test_invalid_month_is_empty() {
        assert!(visible_planets(0, 0.0).is_empty());
        assert!(visible_planets(13, 0.0).is_empty());
    }

    #[test]
    fn test_magnitudes() {
        assert_eq!(Venus.typical_magnitude(), -4.0);
        assert_eq!(Jupiter.as_str(), "Jupiter");
    }
}
