use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sample::{PositionSample, RawSample};

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("satellite {sat_id}: samples not strictly increasing at index {index}")]
    OutOfOrder { sat_id: String, index: usize },
    #[error("invalid ephemeris payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Per-satellite metadata carried alongside the sample track.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SatelliteMeta {
    pub name: String,
    #[serde(default = "default_radius")]
    pub reception_radius_km: f64,
}

fn default_radius() -> f64 {
    1500.0
}

/// One satellite's time-ordered samples plus its metadata.
#[derive(Debug, Clone)]
pub struct SatelliteTrack {
    pub meta: SatelliteMeta,
    pub samples: Vec<PositionSample>,
}

/// Wire form of a full ephemeris payload from the propagation collaborator.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RawWindow {
    /// Map of satellite id to `[unix_seconds, lat, lon, alt_km?]` tuples.
    #[schema(value_type = Object)]
    pub ephemeris: BTreeMap<String, Vec<RawSample>>,
    #[serde(default)]
    pub satellites: BTreeMap<String, SatelliteMeta>,
}

/// A bounded snapshot of position samples for every tracked satellite.
///
/// Windows are replaced wholesale when the consumer re-centers on a new
/// instant; they are never mutated in place. Within each satellite's track,
/// timestamps are strictly increasing (enforced at construction).
#[derive(Debug, Clone, Default)]
pub struct EphemerisWindow {
    satellites: BTreeMap<String, SatelliteTrack>,
}

impl EphemerisWindow {
    /// Build a window from validated tracks, checking timestamp ordering.
    pub fn new(satellites: BTreeMap<String, SatelliteTrack>) -> Result<Self, WindowError> {
        for (sat_id, track) in &satellites {
            for (i, pair) in track.samples.windows(2).enumerate() {
                if pair[1].timestamp <= pair[0].timestamp {
                    return Err(WindowError::OutOfOrder {
                        sat_id: sat_id.clone(),
                        index: i + 1,
                    });
                }
            }
        }
        Ok(Self { satellites })
    }

    /// Ingest a raw payload. Samples missing timestamp/latitude/longitude are
    /// skipped and counted; satellites absent from the metadata map get a
    /// placeholder name and the default reception radius.
    pub fn from_raw(raw: RawWindow) -> Result<(Self, usize), WindowError> {
        let mut skipped = 0usize;
        let mut satellites = BTreeMap::new();

        for (sat_id, raw_samples) in raw.ephemeris {
            let total = raw_samples.len();
            let samples: Vec<PositionSample> = raw_samples
                .into_iter()
                .filter_map(RawSample::into_sample)
                .collect();

            if samples.len() < total {
                let dropped = total - samples.len();
                log::warn!("satellite {}: skipped {} malformed samples", sat_id, dropped);
                skipped += dropped;
            }

            let meta = raw.satellites.get(&sat_id).cloned().unwrap_or(SatelliteMeta {
                name: sat_id.clone(),
                reception_radius_km: default_radius(),
            });

            satellites.insert(sat_id, SatelliteTrack { meta, samples });
        }

        Ok((Self::new(satellites)?, skipped))
    }

    pub fn from_json(payload: &str) -> Result<(Self, usize), WindowError> {
        let raw: RawWindow = serde_json::from_str(payload)?;
        Self::from_raw(raw)
    }

    pub fn track(&self, sat_id: &str) -> Option<&SatelliteTrack> {
        self.satellites.get(sat_id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = (&String, &SatelliteTrack)> {
        self.satellites.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    /// Time span covered by the window, from the earliest to the latest
    /// sample across all tracks.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self
            .satellites
            .values()
            .filter_map(|t| t.samples.first())
            .map(|s| s.timestamp)
            .min()?;
        let end = self
            .satellites
            .values()
            .filter_map(|t| t.samples.last())
            .map(|s| s.timestamp)
            .max()?;
        Some((start, end))
    }
}
