use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::visibility::StationLocation;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub satellites: BTreeMap<String, SatelliteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Global elevation threshold for visibility, in degrees.
    #[serde(default = "default_min_elevation")]
    pub min_elevation_deg: f64,
    /// Ephemeris payload to preload at startup, if any.
    #[serde(default)]
    pub ephemeris_file: Option<PathBuf>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_elevation_deg: default_min_elevation(),
            ephemeris_file: None,
        }
    }
}

fn default_min_elevation() -> f64 {
    5.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
        }
    }
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("recordings")
}

#[derive(Debug, Clone, Deserialize)]
pub struct SatelliteConfig {
    pub name: String,
    #[serde(default = "default_radius")]
    pub reception_radius_km: f64,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub samplerate: Option<String>,
    /// Capture command template, see `executor::build_capture_command`.
    #[serde(default)]
    pub command: Option<String>,
}

fn default_radius() -> f64 {
    1500.0
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn station_location(&self) -> StationLocation {
        StationLocation {
            latitude_deg: self.station.latitude,
            longitude_deg: self.station.longitude,
        }
    }

    /// Display name for a satellite, falling back to its id.
    pub fn satellite_name(&self, sat_id: &str) -> String {
        self.satellites
            .get(sat_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| sat_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let yaml = "station:\n  latitude: 52.5\n  longitude: 13.4\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.tracking.min_elevation_deg, 5.0);
        assert_eq!(config.recording.artifacts_dir, PathBuf::from("recordings"));
        assert!(config.satellites.is_empty());
        assert_eq!(config.satellite_name("25544"), "25544");
    }

    #[test]
    fn full_satellite_entry() {
        let yaml = r#"
station:
  name: home
  latitude: 52.5
  longitude: 13.4
tracking:
  min_elevation_deg: 10
satellites:
  "25544":
    name: ISS
    reception_radius_km: 2200
    frequency: 145.8M
    samplerate: 48k
    command: "rtl_fm -f {freq} -s {rate} -T {duration}"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tracking.min_elevation_deg, 10.0);
        let sat = &config.satellites["25544"];
        assert_eq!(sat.name, "ISS");
        assert_eq!(sat.reception_radius_km, 2200.0);
        assert_eq!(config.satellite_name("25544"), "ISS");
    }
}
