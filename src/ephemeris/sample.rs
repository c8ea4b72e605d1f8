use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Altitude assumed when the upstream propagator omits it, in km.
pub const DEFAULT_ALTITUDE_KM: f64 = 600.0;

/// A satellite's geodetic position at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
pub struct PositionSample {
    pub timestamp: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Wire form of a sample as the propagation collaborator emits it:
/// `[unix_seconds, lat, lon, alt_km?]`. Altitude is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSample(pub Vec<serde_json::Value>);

impl RawSample {
    /// Validate and convert a raw record. Altitude falls back to
    /// [`DEFAULT_ALTITUDE_KM`]; a record missing timestamp, latitude or
    /// longitude cannot be interpolated and yields `None`.
    pub fn into_sample(self) -> Option<PositionSample> {
        let ts_secs = self.0.first().and_then(|v| v.as_f64())?;
        let latitude_deg = self.0.get(1).and_then(|v| v.as_f64())?;
        let longitude_deg = self.0.get(2).and_then(|v| v.as_f64())?;
        let altitude_km = self
            .0
            .get(3)
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_ALTITUDE_KM);

        let millis = (ts_secs * 1000.0).round() as i64;
        let timestamp = Utc.timestamp_millis_opt(millis).single()?;

        Some(PositionSample {
            timestamp,
            latitude_deg,
            longitude_deg,
            altitude_km,
        })
    }
}
