use anyhow::{Context, Result};
use log::debug;
use nightsky::observer::ObserverLocation;
use nightsky::passes::PassSearch;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub observer: ObserverConfig,
    pub iss: IssConfig,
    pub prediction: PredictionConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64, // meters
    /// Free-text place name, geocoded at startup when set.
    pub place: Option<String>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            name: "Austin, TX".to_string(),
            latitude: 30.2672,
            longitude: -97.7431,
            altitude: 150.0,
            place: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssSource {
    /// Live sub-point from the position feed.
    Feed,
    /// SGP4 propagation of a local or downloaded element set.
    Tle,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IssConfig {
    pub source: IssSource,
    pub feed_url: String,
    pub tle_file: Option<PathBuf>,
    pub tle_url: String,
    pub satellite: String,
    pub poll_seconds: u64,
}

impl Default for IssConfig {
    fn default() -> Self {
        Self {
            source: IssSource::Feed,
            feed_url: "http://api.open-notify.org/iss-now.json".to_string(),
            tle_file: None,
            tle_url: "https://celestrak.org/NORAD/elements/gp.php?GROUP=stations&FORMAT=tle"
                .to_string(),
            satellite: "ISS".to_string(),
            poll_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub num_passes: usize,
    pub min_elevation: f64,
    pub search_days: f64,
    pub time_step: f64, // seconds
}

impl Default for PredictionConfig {
    fn default() -> Self {
        let search = PassSearch::default();
        Self {
            num_passes: search.num_passes,
            min_elevation: search.min_elevation,
            search_days: search.search_days,
            time_step: search.time_step_seconds,
        }
    }
}

impl PredictionConfig {
    pub fn search(&self) -> PassSearch {
        PassSearch {
            num_passes: self.num_passes,
            min_elevation: self.min_elevation,
            search_days: self.search_days,
            time_step_seconds: self.time_step,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub refresh_rate: u64, // milliseconds
    pub show_sky_map: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_rate: 1000,
            show_sky_map: true,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nightsky").join("config.toml"))
    }

    /// Read `path`, falling back to the built-in defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn observer(&self) -> Result<ObserverLocation> {
        Ok(ObserverLocation::new(
            self.observer.name.clone(),
            self.observer.latitude,
            self.observer.longitude,
            self.observer.altitude,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.observer.name, "Austin, TX");
        assert_eq!(config.iss.source, IssSource::Feed);
        assert_eq!(config.prediction.search(), PassSearch::default());
        assert!(config.display.show_sky_map);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [observer]
            name = "Reykjavik"
            latitude = 64.1466
            longitude = -21.9426

            [iss]
            source = "tle"
            tle_file = "stations.txt"
            "#,
        )
        .unwrap();

        let observer = config.observer().unwrap();
        assert_eq!(observer.name, "Reykjavik");
        assert_eq!(observer.altitude, 150.0);
        assert_eq!(config.iss.source, IssSource::Tle);
        assert_eq!(config.iss.tle_file, Some(PathBuf::from("stations.txt")));
        assert_eq!(config.iss.satellite, "ISS");
    }

    #[test]
    fn test_out_of_range_observer_is_rejected() {
        let config: Config = toml::from_str("[observer]\nlatitude = 91.0\n").unwrap();
        assert!(config.observer().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/nightsky/config.toml")).unwrap();
        assert_eq!(config.iss.poll_seconds, 10);
    }
}
