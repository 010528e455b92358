//! HTTP collaborators: geocoding, the live ISS position feed and TLE downloads.

use anyhow::{anyhow, bail, Context, Result};
use chrono::DateTime;
use log::debug;
use nightsky::iss::SubPoint;
use nightsky::observer::ObserverLocation;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = concat!("nightsky/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(10);

pub struct Feed {
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct IssNow {
    message: String,
    timestamp: i64,
    iss_position: IssPosition,
}

// The feed sends coordinates as strings
#[derive(Debug, Deserialize)]
struct IssPosition {
    latitude: String,
    longitude: String,
}

impl Place {
    fn into_location(self) -> Result<ObserverLocation> {
        let lat: f64 = self.lat.parse().context("geocoder latitude")?;
        let lon: f64 = self.lon.parse().context("geocoder longitude")?;
        Ok(ObserverLocation::new(self.display_name, lat, lon, 0.0)?)
    }
}

impl IssNow {
    fn into_sub_point(self) -> Result<SubPoint> {
        if self.message != "success" {
            bail!("ISS feed returned {:?}", self.message);
        }
        let timestamp = DateTime::from_timestamp(self.timestamp, 0)
            .ok_or_else(|| anyhow!("ISS feed timestamp out of range: {}", self.timestamp))?;
        Ok(SubPoint {
            latitude: self.iss_position.latitude.parse().context("ISS latitude")?,
            longitude: self.iss_position.longitude.parse().context("ISS longitude")?,
            timestamp,
        })
    }
}

impl Feed {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }

    /// Resolve a free-text place name to coordinates.
    pub fn geocode(&self, place: &str) -> Result<ObserverLocation> {
        debug!("geocoding {:?}", place);
        let places: Vec<Place> = self
            .agent
            .get(NOMINATIM_URL)
            .query("q", place)
            .query("format", "json")
            .query("limit", "1")
            .call()
            .context("geocoding request failed")?
            .into_json()?;

        places
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Could not find location: {}", place))?
            .into_location()
    }

    pub fn iss_sub_point(&self, url: &str) -> Result<SubPoint> {
        let now: IssNow = self
            .agent
            .get(url)
            .call()
            .context("ISS position request failed")?
            .into_json()?;
        now.into_sub_point()
    }

    pub fn tle(&self, url: &str) -> Result<String> {
        debug!("downloading TLEs from {}", url);
        let body = self
            .agent
            .get(url)
            .call()
            .context("TLE download failed")?
            .into_string()?;
        Ok(body)
    }
}
