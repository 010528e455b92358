use chrono::{DateTime, Utc};
use thiserror::Error;

pub type SkyResult<T> = Result<T, SkyError>;

/// Failures the calculator hands back to its caller.
///
/// Polar-day hour angles and empty constellation scans are recovered inside
/// the calculator and never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkyError {
    #[error("invalid night window: sunrise {sunrise} is not after sunset {sunset}")]
    InvalidWindow {
        sunset: DateTime<Utc>,
        sunrise: DateTime<Utc>,
    },
    #[error("satellite position unknown")]
    PositionUnavailable,
    #[error("invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },
    #[error("TLE error: {0}")]
    Tle(String),
    #[error("propagation error: {0}")]
    Propagation(String),
}
