use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// One contiguous interval during which a satellite is receivable.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Pass {
    pub sat_id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Peak elevation over the pass, rounded to whole degrees.
    pub max_elevation_deg: i32,
    /// Closest slant range over the pass, rounded to whole km.
    pub min_range_km: i32,
}

impl Pass {
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}
