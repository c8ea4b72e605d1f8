use chrono::{DateTime, Utc};
use serde::Serialize;

use super::sample::PositionSample;

/// An interpolated position plus the index of the sample bracketing it from
/// below (used by trajectory rendering to pick up the tail of the track).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
pub struct LocatedPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub index: usize,
}

/// Estimate a satellite's position at `t` by linear interpolation between the
/// two samples bracketing it.
///
/// Returns `None` when `t` falls before the first sample or at/after the last
/// one; there is no extrapolation. Callers are expected to re-center the
/// ephemeris window when that happens.
pub fn locate(samples: &[PositionSample], t: DateTime<Utc>) -> Option<LocatedPosition> {
    // Index of the latest sample with timestamp <= t.
    let upper = samples.partition_point(|s| s.timestamp <= t);
    if upper == 0 || upper >= samples.len() {
        return None;
    }
    let index = upper - 1;

    let p1 = &samples[index];
    let p2 = &samples[index + 1];
    let span = (p2.timestamp - p1.timestamp).num_milliseconds() as f64;
    let factor = (t - p1.timestamp).num_milliseconds() as f64 / span;

    let latitude_deg = p1.latitude_deg + (p2.latitude_deg - p1.latitude_deg) * factor;
    let altitude_km = p1.altitude_km + (p2.altitude_km - p1.altitude_km) * factor;

    // Shortest-arc longitude: a raw delta beyond 180 degrees means the track
    // crossed the antimeridian between the two samples.
    let mut d_lon = p2.longitude_deg - p1.longitude_deg;
    if d_lon > 180.0 {
        d_lon -= 360.0;
    } else if d_lon < -180.0 {
        d_lon += 360.0;
    }
    let mut longitude_deg = p1.longitude_deg + d_lon * factor;
    if longitude_deg > 180.0 {
        longitude_deg -= 360.0;
    } else if longitude_deg < -180.0 {
        longitude_deg += 360.0;
    }

    Some(LocatedPosition {
        latitude_deg,
        longitude_deg,
        altitude_km,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn sample(ts: i64, lat: f64, lon: f64, alt: f64) -> PositionSample {
        PositionSample {
            timestamp: Utc.timestamp_opt(ts, 0).unwrap(),
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_km: alt,
        }
    }

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    #[test]
    fn interpolates_between_brackets() {
        let samples = vec![sample(0, 10.0, 20.0, 400.0), sample(100, 20.0, 40.0, 500.0)];
        let p = locate(&samples, at(25)).unwrap();
        assert_relative_eq!(p.latitude_deg, 12.5);
        assert_relative_eq!(p.longitude_deg, 25.0);
        assert_relative_eq!(p.altitude_km, 425.0);
        assert_eq!(p.index, 0);
    }

    #[test]
    fn values_stay_within_bracket_bounds() {
        let samples = vec![sample(0, -5.0, 10.0, 600.0), sample(60, 5.0, 30.0, 620.0)];
        for t in [1, 15, 30, 45, 59] {
            let p = locate(&samples, at(t)).unwrap();
            assert!((-5.0..=5.0).contains(&p.latitude_deg));
            assert!((10.0..=30.0).contains(&p.longitude_deg));
            assert!((600.0..=620.0).contains(&p.altitude_km));
        }
    }

    #[test]
    fn no_extrapolation_outside_window() {
        let samples = vec![sample(100, 0.0, 0.0, 600.0), sample(200, 1.0, 1.0, 600.0)];
        assert!(locate(&samples, at(99)).is_none());
        assert!(locate(&samples, at(200)).is_none());
        assert!(locate(&samples, at(500)).is_none());
        assert!(locate(&samples, at(100)).is_some());
    }

    #[test]
    fn empty_and_single_sample_tracks() {
        assert!(locate(&[], at(0)).is_none());
        let one = vec![sample(100, 0.0, 0.0, 600.0)];
        assert!(locate(&one, at(100)).is_none());
    }

    #[test]
    fn antimeridian_crossing_wraps_through_180() {
        // 179E -> 179W should pass through the antimeridian, not through 0.
        let samples = vec![sample(0, 0.0, 179.0, 600.0), sample(100, 0.0, -179.0, 600.0)];
        let p = locate(&samples, at(50)).unwrap();
        assert_relative_eq!(p.longitude_deg.abs(), 180.0, epsilon = 1e-9);

        let p = locate(&samples, at(25)).unwrap();
        assert_relative_eq!(p.longitude_deg, 179.5);
        let p = locate(&samples, at(75)).unwrap();
        assert_relative_eq!(p.longitude_deg, -179.5);
    }

    #[test]
    fn westward_antimeridian_crossing() {
        let samples = vec![sample(0, 0.0, -179.0, 600.0), sample(100, 0.0, 179.0, 600.0)];
        let p = locate(&samples, at(25)).unwrap();
        assert_relative_eq!(p.longitude_deg, -179.5);
    }
}
