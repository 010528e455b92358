//! Night-sky visibility and timing calculator.
//!
//! Pure functions of an observer position and a clock time: approximate sun
//! and twilight times, moon phase, constellations that climb high enough to
//! see tonight, seasonal planets, and whether the ISS is in view. No I/O
//! happens here; positions from web feeds are handed in by the caller.

pub mod catalog;
pub mod constellations;
pub mod coords;
pub mod error;
pub mod geometry;
pub mod iss;
pub mod moon;
pub mod observer;
pub mod orbit;
pub mod passes;
pub mod planets;
pub mod report;
pub mod showers;
pub mod solar;

pub use error::{SkyError, SkyResult};
pub use observer::ObserverLocation;
pub use report::NightSkyReport;
